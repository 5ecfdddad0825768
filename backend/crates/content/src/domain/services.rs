//! Domain Services
//!
//! Pure rating logic.

use crate::domain::value_object::Score;

/// Mean of the scores rounded to the nearest integer, halves away from zero
///
/// `None` when there are no scores. Integer arithmetic only, so the result
/// agrees with `ROUND(AVG(score))` in PostgreSQL.
pub fn average_score<I>(scores: I) -> Option<i32>
where
    I: IntoIterator<Item = Score>,
{
    let (sum, count) = scores
        .into_iter()
        .fold((0i64, 0i64), |(sum, count), s| (sum + i64::from(s.get()), count + 1));

    if count == 0 {
        return None;
    }

    // scores are positive: floor((2 * sum + count) / (2 * count))
    i32::try_from((2 * sum + count) / (2 * count)).ok()
}
