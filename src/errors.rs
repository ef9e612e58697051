//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_translearn_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum TransLearnError {
            $($variant(String),)*
        }

        impl TransLearnError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(TransLearnError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(TransLearnError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(TransLearnError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl TransLearnError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        TransLearnError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_translearn_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    Validation("E004", "Validation Error"),
    NotFound("E005", "Resource Not Found"),
    Conflict("E006", "Constraint Violation"),
    Serialization("E007", "Serialization Error"),
    Scoring("E008", "Scoring Service Error"),
    FileOperation("E009", "File Operation Error"),
}

impl TransLearnError {
    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for TransLearnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for TransLearnError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for TransLearnError {
    fn from(err: sea_orm::DbErr) -> Self {
        TransLearnError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for TransLearnError {
    fn from(err: std::io::Error) -> Self {
        TransLearnError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for TransLearnError {
    fn from(err: serde_json::Error) -> Self {
        TransLearnError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for TransLearnError {
    fn from(err: reqwest::Error) -> Self {
        TransLearnError::Scoring(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TransLearnError>;
