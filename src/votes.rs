//! Upvote/downvote estimation from a post's score and upvote ratio.
//!
//! Reddit only reports the net score and the fraction of votes that were
//! upvotes. Solving `up - down = score` and `up / (up + down) = ratio` gives
//! `total = score / (2 * ratio - 1)`; the exact ratios 0.0, 0.5 and 1.0 are
//! special-cased since the general formula either divides by zero or is
//! meaningless there.

/// Estimate `(upvotes, downvotes)` for a post.
///
/// `upvotes` is always the raw score, so it is negative for negatively scored
/// posts. `downvotes` is clamped at zero. Ratios close to (but not exactly)
/// 0.5 produce very large totals; float-to-int conversion saturates.
pub fn estimate(score: i64, upvote_ratio: f64) -> (i64, i64) {
    let score_f = score as f64;

    #[allow(clippy::float_cmp)]
    let total_votes = if upvote_ratio == 0.5 {
        score_f * 2.0
    } else if upvote_ratio == 1.0 {
        score_f
    } else if upvote_ratio == 0.0 {
        score_f.abs()
    } else {
        score_f / (2.0 * upvote_ratio - 1.0)
    };

    let downvotes = (total_votes - score_f).max(0.0);
    (score, downvotes as i64)
}
