use validator::Validate;

use crate::interceptors::AppError;

/// Validate a request struct using validator. Field messages are sorted by
/// field name so the error text is stable.
pub fn validate_request<T: Validate>(request: &T) -> Result<(), AppError> {
    request
        .validate()
        .map_err(|e| {
            let mut fields: Vec<String> = e
                .field_errors()
                .iter()
                .map(|(field, errors)| {
                    let messages: Vec<String> = errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    format!("{}: {}", field, messages.join(", "))
                })
                .collect();
            fields.sort();

            AppError::ValidationError(fields.join("; "))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{CreateUserRequest, JoinQueueRequest};

    #[test]
    fn reports_every_invalid_field_in_order() {
        let request = CreateUserRequest {
            email: "nope".to_string(),
            password: "123".to_string(),
            name: None,
        };

        match validate_request(&request) {
            Err(AppError::ValidationError(msg)) => assert_eq!(
                msg,
                "email: Invalid email format; password: Password must be at least 6 characters"
            ),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn accepts_valid_join_request() {
        let request = JoinQueueRequest {
            usuario_id: "u-1".to_string(),
        };
        assert!(validate_request(&request).is_ok());

        let empty = JoinQueueRequest {
            usuario_id: String::new(),
        };
        assert!(validate_request(&empty).is_err());
    }
}
