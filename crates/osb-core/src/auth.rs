use crate::domain::UserId;

/// The operator check is a plain equality test against the single configured
/// privileged id. Callers that fail it are dropped silently (no reply), so
/// arbitrary users cannot probe which commands are privileged.
pub fn is_operator(user_id: Option<UserId>, operator_id: i64) -> bool {
    let Some(user_id) = user_id else {
        return false;
    };
    if operator_id == 0 {
        return false;
    }
    user_id.0 == operator_id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_matches_configured_id() {
        assert!(is_operator(Some(UserId(42)), 42));
        assert!(!is_operator(Some(UserId(43)), 42));
        assert!(!is_operator(None, 42));
    }

    #[test]
    fn zero_operator_id_authorizes_nobody() {
        assert!(!is_operator(Some(UserId(0)), 0));
    }
}
