use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::user::models::UserId;

/// Discount coupon owned by a single user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub discount_percentage: u8,
    pub expiration_date: DateTime<Utc>,
    pub is_active: bool,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    const GIFT_PREFIX: &'static str = "GIFT";
    const GIFT_DISCOUNT_PERCENTAGE: u8 = 10;
    const GIFT_VALIDITY_DAYS: i64 = 30;

    /// Reward coupon granted after a large purchase.
    ///
    /// Code is `GIFT` followed by six uppercase hex characters.
    pub fn gift(user_id: UserId, now: DateTime<Utc>) -> Self {
        let suffix: String = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(6)
            .collect::<String>()
            .to_uppercase();

        Self {
            id: Uuid::new_v4(),
            code: format!("{}{}", Self::GIFT_PREFIX, suffix),
            discount_percentage: Self::GIFT_DISCOUNT_PERCENTAGE,
            expiration_date: now + Duration::days(Self::GIFT_VALIDITY_DAYS),
            is_active: true,
            user_id,
            created_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration_date < now
    }

    /// Amount taken off `total_cents`, rounded to the nearest cent.
    ///
    /// `None` if the intermediate product does not fit in cents.
    pub fn discount_on(&self, total_cents: i64) -> Option<i64> {
        let percentage = i64::from(self.discount_percentage.min(100));
        total_cents
            .checked_mul(percentage)?
            .checked_add(50)
            .map(|scaled| scaled / 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gift_coupon_shape() {
        let now = Utc::now();
        let coupon = Coupon::gift(UserId::new(), now);

        assert!(coupon.code.starts_with("GIFT"));
        assert_eq!(coupon.code.len(), 10);
        assert_eq!(coupon.code, coupon.code.to_uppercase());
        assert_eq!(coupon.discount_percentage, 10);
        assert_eq!(coupon.expiration_date, now + Duration::days(30));
        assert!(coupon.is_active);
    }

    #[test]
    fn test_discount_rounds_to_cent() {
        let mut coupon = Coupon::gift(UserId::new(), Utc::now());
        coupon.discount_percentage = 15;

        assert_eq!(coupon.discount_on(10_000), Some(1_500));
        assert_eq!(coupon.discount_on(999), Some(150));
        assert_eq!(coupon.discount_on(0), Some(0));
        assert_eq!(coupon.discount_on(i64::MAX / 2), None);
    }

    #[test]
    fn test_expiry_is_strict() {
        let now = Utc::now();
        let mut coupon = Coupon::gift(UserId::new(), now);

        coupon.expiration_date = now;
        assert!(!coupon.is_expired(now));
        assert!(coupon.is_expired(now + Duration::seconds(1)));
    }
}
