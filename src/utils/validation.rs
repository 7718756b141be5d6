use crate::error::{EngineError, EngineResult};
use crate::models::InteractionType;
use uuid::Uuid;

pub fn validate_user_id(user_id: Uuid) -> EngineResult<()> {
    if user_id.is_nil() {
        return Err(EngineError::invalid("user id cannot be nil"));
    }
    Ok(())
}

pub fn validate_product_id(product_id: Uuid) -> EngineResult<()> {
    if product_id.is_nil() {
        return Err(EngineError::invalid("product id cannot be nil"));
    }
    Ok(())
}

pub fn validate_limit(limit: usize, max_limit: usize) -> EngineResult<()> {
    if limit == 0 {
        return Err(EngineError::invalid("limit must be greater than 0"));
    }

    if limit > max_limit {
        return Err(EngineError::invalid(format!(
            "limit too large: {} (max {})",
            limit, max_limit
        )));
    }

    Ok(())
}

pub fn validate_rating(rating: Option<u8>) -> EngineResult<()> {
    if let Some(r) = rating {
        if !(1..=5).contains(&r) {
            return Err(EngineError::invalid(format!(
                "rating must be between 1 and 5, got {}",
                r
            )));
        }
    }
    Ok(())
}

pub fn validate_track_request(
    user_id: Uuid,
    product_id: Uuid,
    _interaction_type: InteractionType,
    rating: Option<u8>,
) -> EngineResult<()> {
    validate_user_id(user_id)?;
    validate_product_id(product_id)?;
    validate_rating(rating)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_limit() {
        assert!(validate_limit(10, 100).is_ok());
        assert!(validate_limit(0, 100).is_err());
        assert!(validate_limit(101, 100).is_err());
    }

    #[test]
    fn test_validate_rating() {
        assert!(validate_rating(None).is_ok());
        assert!(validate_rating(Some(1)).is_ok());
        assert!(validate_rating(Some(5)).is_ok());
        assert!(validate_rating(Some(0)).is_err());
        assert!(validate_rating(Some(6)).is_err());
    }

    #[test]
    fn test_validate_track_request() {
        let ok = validate_track_request(
            Uuid::new_v4(),
            Uuid::new_v4(),
            InteractionType::Review,
            Some(4),
        );
        assert!(ok.is_ok());

        let nil_user = validate_track_request(
            Uuid::nil(),
            Uuid::new_v4(),
            InteractionType::View,
            None,
        );
        assert!(matches!(nil_user, Err(EngineError::InvalidInput(_))));
    }
}
