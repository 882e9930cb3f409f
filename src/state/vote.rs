use super::{AppState, Outcome};
use crate::error::RoomError;
use crate::machine::Event;

impl AppState {
    /// Record `voter`'s vote. The last vote in closes the ballot.
    pub async fn cast_vote(
        &self,
        code: &str,
        voter: &str,
        target: &str,
    ) -> Result<Outcome, RoomError> {
        self.apply_intent(code, voter, Event::CastVote(target.to_string()))
            .await
    }
}
