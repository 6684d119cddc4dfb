//! NNTP status code constants per RFC 3977 and RFC 4643
//!
//! Provides named constants for the response codes this server emits,
//! organized by category (informational, success, continuation, error).

// 1xx - Informational (RFC 3977 §3.2.1.1)

/// Help text follows (RFC 3977 §7.2)
pub const HELP_TEXT: u16 = 100;
/// Capability list follows (RFC 3977 §5.2)
pub const CAPABILITY_LIST: u16 = 101;
/// Server date and time (RFC 3977 §7.1)
pub const SERVER_DATE: u16 = 111;

// 2xx - Success (RFC 3977 §3.2.1.2)

/// Server ready, posting allowed (RFC 3977 §5.1.1)
pub const POSTING_ALLOWED: u16 = 200;
/// Connection closing (RFC 3977 §5.4)
pub const CONNECTION_CLOSING: u16 = 205;
/// Group selected (RFC 3977 §6.1.1)
pub const GROUP_SELECTED: u16 = 211;
/// Article follows (RFC 3977 §6.2.1)
pub const ARTICLE_FOLLOWS: u16 = 220;
/// Head follows (RFC 3977 §6.2.2)
pub const HEAD_FOLLOWS: u16 = 221;
/// Body follows (RFC 3977 §6.2.3)
pub const BODY_FOLLOWS: u16 = 222;
/// Article exists (RFC 3977 §6.2.4)
pub const ARTICLE_EXISTS: u16 = 223;
/// Article received OK (RFC 3977 §6.3.1)
pub const ARTICLE_POSTED: u16 = 240;
/// Authentication accepted (RFC 4643 §2.3)
pub const AUTH_ACCEPTED: u16 = 281;

// 3xx - Continuation (RFC 3977 §3.2.1.3)

/// Send article to be posted (RFC 3977 §6.3.2)
pub const SEND_ARTICLE: u16 = 340;
/// Password required (RFC 4643 §2.3)
pub const PASSWORD_REQUIRED: u16 = 381;

// 4xx - Temporary errors (RFC 3977 §3.2.1.4)

/// Service temporarily unavailable (RFC 3977 §3.2.1)
pub const SERVICE_UNAVAILABLE: u16 = 400;
/// No such newsgroup (RFC 3977 §6.1.1)
pub const NO_SUCH_GROUP: u16 = 411;
/// No newsgroup selected (RFC 3977 §6.1.1)
pub const NO_GROUP_SELECTED: u16 = 412;
/// No current article selected (RFC 3977 §6.2.4)
pub const NO_CURRENT_ARTICLE: u16 = 420;
/// No next article (RFC 3977 §6.1.4)
pub const NO_NEXT_ARTICLE: u16 = 421;
/// No previous article (RFC 3977 §6.1.3)
pub const NO_PREV_ARTICLE: u16 = 422;
/// No article with that number (RFC 3977 §6.2.1)
pub const NO_SUCH_ARTICLE_NUMBER: u16 = 423;
/// No article with that message-id (RFC 3977 §6.2.1)
pub const NO_SUCH_ARTICLE_ID: u16 = 430;
/// Posting failed (RFC 3977 §6.3.1)
pub const POSTING_FAILED: u16 = 441;
/// Authentication rejected (RFC 4643 §2.3)
pub const AUTH_REJECTED: u16 = 481;
/// Authentication out of sequence (RFC 4643 §2.3)
pub const AUTH_OUT_OF_SEQUENCE: u16 = 482;

// 5xx - Permanent errors (RFC 3977 §3.2.1.5)

/// Command not recognized (RFC 3977 §3.2.1)
pub const COMMAND_NOT_RECOGNIZED: u16 = 500;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_2xx_success_range() {
        let codes = [
            POSTING_ALLOWED,
            CONNECTION_CLOSING,
            GROUP_SELECTED,
            ARTICLE_FOLLOWS,
            HEAD_FOLLOWS,
            BODY_FOLLOWS,
            ARTICLE_EXISTS,
            ARTICLE_POSTED,
            AUTH_ACCEPTED,
        ];
        for code in codes {
            assert!((200..300).contains(&code), "Code {} should be 2xx", code);
        }
    }

    #[test]
    fn test_3xx_continuation_range() {
        assert!((300..400).contains(&SEND_ARTICLE));
        assert!((300..400).contains(&PASSWORD_REQUIRED));
    }

    #[test]
    fn test_4xx_temporary_error_range() {
        let codes = [
            SERVICE_UNAVAILABLE,
            NO_SUCH_GROUP,
            NO_GROUP_SELECTED,
            NO_CURRENT_ARTICLE,
            NO_NEXT_ARTICLE,
            NO_PREV_ARTICLE,
            NO_SUCH_ARTICLE_NUMBER,
            NO_SUCH_ARTICLE_ID,
            POSTING_FAILED,
            AUTH_REJECTED,
            AUTH_OUT_OF_SEQUENCE,
        ];
        for code in codes {
            assert!((400..500).contains(&code), "Code {} should be 4xx", code);
        }
    }

    #[test]
    fn test_specific_code_values() {
        assert_eq!(ARTICLE_POSTED, 240);
        assert_eq!(SEND_ARTICLE, 340);
        assert_eq!(NO_CURRENT_ARTICLE, 420);
        assert_eq!(NO_SUCH_ARTICLE_NUMBER, 423);
        assert_eq!(NO_SUCH_ARTICLE_ID, 430);
        assert_eq!(POSTING_FAILED, 441);
        assert_eq!(COMMAND_NOT_RECOGNIZED, 500);
    }
}
