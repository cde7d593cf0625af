/*
 * Responsibility
 * - 成功レスポンスの共通 envelope: {resultCode, msg, data}
 * - エラー側 ({resultCode, msg}) は crate::error::ErrorBody
 */
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RsData<T: Serialize> {
    pub result_code: &'static str,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> RsData<T> {
    pub fn new(result_code: &'static str, msg: impl Into<String>, data: T) -> Self {
        Self {
            result_code,
            msg: msg.into(),
            data: Some(data),
        }
    }
}

impl RsData<()> {
    pub fn message(result_code: &'static str, msg: impl Into<String>) -> Self {
        Self {
            result_code,
            msg: msg.into(),
            data: None,
        }
    }
}
