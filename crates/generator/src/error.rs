use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeneratorError>;

#[derive(Error, Debug)]
pub enum GeneratorError {
    /// The id does not match the `[prefix-]lib-pattern-style-lang` shape.
    /// Grammar-shaped ids with unknown tokens never hit this; they route to
    /// the generic fallback instead.
    #[error("id '{0}' does not match the generated-id grammar")]
    InvalidId(String),
}
