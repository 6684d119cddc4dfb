//! NNTP protocol layer: framing, status codes, responses, and articles

pub mod article;
pub mod codes;
pub mod framer;
pub mod parser;
pub mod responses;

pub use article::{Article, Headers, ParseError};
pub use framer::{dot_stuff, dot_unstuff, FramerError, LineFramer, ProtocolLine};
pub use parser::{parse_article_spec, parse_group_name, ArticleSpec};
pub use responses::{greeting, response};
