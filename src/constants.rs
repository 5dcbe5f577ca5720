/// Pagination constants shared by every question listing endpoint.

/// Number of questions returned per page.
pub const QUESTIONS_PER_PAGE: usize = 10;

/// Page served when the request carries no `page` parameter.
pub const DEFAULT_PAGE: usize = 1;
