use actix_web::dev::Payload;
use actix_web::error::InternalError;
use actix_web::{FromRequest, HttpRequest, HttpResponse};
use std::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

/// 调用方用户 ID 所在的请求头，由上游网关在鉴权后写入
pub const USER_ID_HEADER: &str = "X-User-Id";

/// 定义从路径参数中安全提取正整数 ID 的提取器
#[macro_export]
macro_rules! define_safe_i64_extractor {
    ($name:ident, $param:expr) => {
        pub struct $name(pub i64);

        impl actix_web::FromRequest for $name {
            type Error = actix_web::Error;
            type Future = std::future::Ready<Result<Self, Self::Error>>;

            fn from_request(
                req: &actix_web::HttpRequest,
                _: &mut actix_web::dev::Payload,
            ) -> Self::Future {
                let result = req
                    .match_info()
                    .get($param)
                    .and_then(|v| v.parse::<i64>().ok())
                    .filter(|v| *v > 0)
                    .map($name)
                    .ok_or_else(|| {
                        let message = format!("无效的路径参数: {}", $param);
                        actix_web::error::InternalError::from_response(
                            message.clone(),
                            actix_web::HttpResponse::BadRequest().json(
                                $crate::models::ApiResponse::error_empty(
                                    $crate::models::ErrorCode::BadRequest,
                                    message,
                                ),
                            ),
                        )
                        .into()
                    });
                std::future::ready(result)
            }
        }
    };
}

define_safe_i64_extractor!(SafeIDI64, "id");
define_safe_i64_extractor!(SafeClassIdI64, "class_id");

/// 当前调用方的用户 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerId(pub i64);

impl CallerId {
    pub fn from_request_headers(req: &HttpRequest) -> Option<Self> {
        req.headers()
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|v| *v > 0)
            .map(CallerId)
    }
}

impl FromRequest for CallerId {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = Self::from_request_headers(req).ok_or_else(|| {
            InternalError::from_response(
                "missing caller id",
                HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                    ErrorCode::Unauthorized,
                    "无法获取用户信息",
                )),
            )
            .into()
        });
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_caller_id_from_header() {
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "42"))
            .to_http_request();
        assert_eq!(CallerId::from_request_headers(&req), Some(CallerId(42)));

        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "abc"))
            .to_http_request();
        assert_eq!(CallerId::from_request_headers(&req), None);

        let req = TestRequest::default().to_http_request();
        assert_eq!(CallerId::from_request_headers(&req), None);
    }

    #[actix_web::test]
    async fn test_safe_id_rejects_non_positive() {
        let req = TestRequest::default()
            .param("id", "0")
            .to_http_request();
        let result = SafeIDI64::extract(&req).await;
        assert!(result.is_err());

        let req = TestRequest::default()
            .param("id", "17")
            .to_http_request();
        assert_eq!(SafeIDI64::extract(&req).await.unwrap().0, 17);
    }
}
