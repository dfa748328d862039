//! Which posts a non-owning viewer may see.
//!
//! A post is publicly visible when it is published, its publication date has
//! passed and its category, if any, is published. Location flags do not take
//! part in the decision.

use super::post::PostCard;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    now: DateTime<Utc>,
}

impl Visibility {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn moment(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn admits(&self, card: &PostCard) -> bool {
        card.post.published.is_published
            && card.post.pub_date <= self.now
            && card.category.as_ref().map_or(true, |c| c.is_published)
    }

    #[cfg(test)]
    pub fn apply(&self, cards: impl IntoIterator<Item = PostCard>) -> Vec<PostCard> {
        cards.into_iter().filter(|card| self.admits(card)).collect()
    }
}
