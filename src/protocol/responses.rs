//! NNTP response line constants and construction helpers
//!
//! Pre-defined response lines and helpers for constructing responses
//! according to RFC 3977. The fixed strings here are part of the wire
//! contract and must not be reworded.

/// Connection closing response (205)
pub const GOODBYE: &str = "205 bye";

/// Continue response to POST (340)
pub const SEND_ARTICLE: &str = "340 send article";

/// Successful posting (240)
pub const POSTED_OK: &str = "240 article posted ok";

/// Successful cancel via control article (240)
pub const CANCELLED: &str = "240 article cancelled";

/// Successful supersede (240)
pub const REPLACED: &str = "240 article replaced";

/// Posting rejected: our own host already appears in the Path header (441)
pub const ALREADY_KNOWN: &str = "441 I know this article already";

/// Posting rejected: none of the named groups exist here (441)
pub const NO_SUCH_NEWSGROUP: &str = "441 newsgroup not found";

/// Backend failure surfaced to the client (500)
pub const INTERNAL_ERROR: &str = "500 internal server error";

/// Header block failed to parse during POST (500)
pub const POSTING_FAILED: &str = "500 posting failed";

/// POST exceeded the configured maximum article size (500)
pub const ARTICLE_TOO_LONG: &str = "500 article too long";

/// Malformed command arguments (500)
pub const INVALID_USAGE: &str = "500 invalid command usage";

/// Unrecognized command keyword (500)
pub const NOT_SUPPORTED: &str = "500 command not supported";

/// Protocol line exceeded the configured maximum length (500)
pub const LINE_TOO_LONG: &str = "500 line too long";

/// Worker budget exhausted (400)
pub const OVERLOADED: &str = "400 temporary overload";

// Reader-side errors (RFC 3977 §6)

/// No newsgroup selected (412)
pub const NO_GROUP_SELECTED: &str = "412 no newsgroup selected";

/// No current article selected (420)
pub const NO_CURRENT_ARTICLE: &str = "420 no current article";

/// No next article in group (421)
pub const NO_NEXT_ARTICLE: &str = "421 no next article";

/// No previous article in group (422)
pub const NO_PREV_ARTICLE: &str = "422 no previous article";

/// No article with that number (423)
pub const NO_SUCH_ARTICLE_NUMBER: &str = "423 no such article number";

/// No article with that message-id (430)
pub const NO_SUCH_ARTICLE: &str = "430 no such article";

/// No such newsgroup for GROUP (411)
pub const NO_SUCH_GROUP: &str = "411 no such newsgroup";

// Authentication responses (RFC 4643)

/// Password required (381)
pub const PASSWORD_REQUIRED: &str = "381 password required";

/// Authentication accepted (281)
pub const AUTH_ACCEPTED: &str = "281 authentication accepted";

/// Authentication rejected (481)
pub const AUTH_REJECTED: &str = "481 authentication failed";

/// AUTHINFO PASS without a preceding USER (482)
pub const AUTH_OUT_OF_SEQUENCE: &str = "482 authentication commands out of sequence";

/// Construct the connection greeting (200)
///
/// # Examples
/// ```
/// use nntpd::protocol::greeting;
///
/// let line = greeting("news.example.com", "nntpd/0.4.0");
/// assert_eq!(line, "200 news.example.com nntpd/0.4.0 ready");
/// ```
#[inline]
#[must_use]
pub fn greeting(hostname: &str, ident: &str) -> String {
    format!("200 {} {} ready", hostname, ident)
}

/// Construct a generic response line with a status code
#[inline]
#[must_use]
pub fn response(code: u16, message: &str) -> String {
    format!("{} {}", code, message)
}
