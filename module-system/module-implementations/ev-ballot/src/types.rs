use ev_modules_api::Timestamp;

/// One election run by the ballot. Elections are never deleted; only the last one can be active.
#[derive(
    borsh::BorshDeserialize,
    borsh::BorshSerialize,
    serde::Serialize,
    serde::Deserialize,
    Debug,
    Clone,
    PartialEq,
    Eq,
)]
pub struct Election {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub is_active: bool,
}

impl Election {
    /// Whether `now` lies inside the closed interval `[start_time, end_time]`.
    pub fn is_open_at(&self, now: Timestamp) -> bool {
        self.start_time <= now && now <= self.end_time
    }
}

#[derive(
    borsh::BorshDeserialize,
    borsh::BorshSerialize,
    serde::Serialize,
    serde::Deserialize,
    Debug,
    Clone,
    PartialEq,
    Eq,
)]
pub struct Candidate {
    pub index: u64,
    pub name: String,
    pub party: String,
    pub image_ref: String,
    pub vote_count: u64,
}

impl Candidate {
    pub(crate) fn new(index: u64, name: String, party: String, image_ref: String) -> Self {
        Self {
            index,
            name,
            party,
            image_ref,
            vote_count: 0,
        }
    }
}
