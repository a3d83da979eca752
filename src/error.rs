use async_openai::error::OpenAIError;
use derive_more::{Display, From};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, From)]
pub enum Error {
    #[display("{_0}")]
    #[from]
    Custom(String),

    #[display("{tool} failed: {message}")]
    ToolFailed { tool: String, message: String },

    #[display("{_0}")]
    #[from]
    Io(std::io::Error),

    #[display("{_0}")]
    #[from]
    Json(serde_json::Error),

    #[display("{_0}")]
    #[from]
    OpenAI(OpenAIError),
}

impl Error {
    pub fn custom(val: impl std::fmt::Display) -> Self {
        Self::Custom(val.to_string())
    }

    pub fn tool_failed(tool: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.to_string(),
        }
    }

    /// Short name of the failure, used in placeholder output.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Custom(_) => "Error",
            Error::ToolFailed { .. } => "ToolFailed",
            Error::Io(_) => "IoError",
            Error::Json(_) => "JsonError",
            Error::OpenAI(err) => match err {
                OpenAIError::ApiError(_) => "ApiError",
                OpenAIError::Reqwest(_) => "Reqwest",
                OpenAIError::JSONDeserialize(..) => "JSONDeserialize",
                OpenAIError::InvalidArgument(_) => "InvalidArgument",
                _ => "OpenAIError",
            },
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn custom_displays_message() {
        let err = Error::custom("boom");
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.kind(), "Error");
    }

    #[test]
    fn tool_failure_names_the_tool() {
        let err = Error::tool_failed("yt-dlp", "exit status 1");
        assert_eq!(err.to_string(), "yt-dlp failed: exit status 1");
        assert_eq!(err.kind(), "ToolFailed");
    }

    #[test]
    fn openai_errors_name_their_variant() {
        let err: Error =
            async_openai::error::OpenAIError::InvalidArgument("model is required".into()).into();
        assert_eq!(err.kind(), "InvalidArgument");
        assert!(err.to_string().contains("model is required"));
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert_eq!(err.kind(), "IoError");
        assert_eq!(err.to_string(), "missing");
    }
}
