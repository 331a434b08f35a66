//! 提交前的客户端校验
//!
//! 校验失败时不发起任何网络请求。

use crate::error::ValidationError;

/// 必填字段，返回去掉首尾空白后的值
pub fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required("Exam name", "  Final  ").unwrap(), "Final");
    }

    #[test]
    fn test_required_rejects_blank() {
        assert_eq!(
            required("Exam URL", " \t "),
            Err(ValidationError::EmptyField { field: "Exam URL" })
        );
    }
}
