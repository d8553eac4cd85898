//! One peer's view of a room: last observed state plus private selection.
//!
//! The selection (a hand card and one of its capture candidates) lives only
//! in this client. It is validated against the last table this client saw,
//! then the move is submitted through `RoomService`, which re-applies it to
//! the authoritative state. The selection is dropped after every submission,
//! whatever the outcome.

use konchina_engine::errors::{DomainError, ValidationKind};
use konchina_engine::{
    is_legal_capture, legal_captures, Card, GameState, GameStatus, JoinOutcome, MoveOutcome,
    PlayerId, PlayerSnapshot,
};
use tracing::debug;

use crate::error::SyncError;
use crate::rooms::{Commit, RoomService, TimeoutOutcome};
use crate::store::{RoomWatch, Versioned};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Selection {
    card: Option<Card>,
    candidates: Vec<Vec<Card>>,
    chosen: Option<usize>,
}

pub struct RoomClient {
    service: RoomService,
    room_id: String,
    player_id: PlayerId,
    seat: usize,
    observed: RoomWatch,
    selection: Selection,
}

impl RoomClient {
    /// Create or join `room_id` as `player_id` and start following it.
    pub async fn connect(
        service: RoomService,
        room_id: impl Into<String>,
        player_id: impl Into<PlayerId>,
    ) -> Result<Self, SyncError> {
        Self::connect_seeded(service, room_id, player_id, None).await
    }

    pub async fn connect_seeded(
        service: RoomService,
        room_id: impl Into<String>,
        player_id: impl Into<PlayerId>,
        seed: Option<u64>,
    ) -> Result<Self, SyncError> {
        let room_id = room_id.into();
        let player_id = player_id.into();
        let observed = service.subscribe(&room_id);
        let commit = service
            .create_or_join_seeded(&room_id, &player_id, seed)
            .await?;
        let seat = match commit.value {
            JoinOutcome::Seated { seat } | JoinOutcome::AlreadySeated { seat } => seat,
        };
        debug!(room_id = %room_id, player_id = %player_id, seat, "Client connected");

        Ok(Self {
            service,
            room_id,
            player_id,
            seat,
            observed,
            selection: Selection::default(),
        })
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn seat(&self) -> usize {
        self.seat
    }

    /// Latest state delivered by the subscription.
    pub fn state(&self) -> Option<Versioned<GameState>> {
        self.observed.borrow().clone()
    }

    pub fn snapshot(&self) -> Result<PlayerSnapshot, SyncError> {
        let current = self.require_state()?;
        Ok(PlayerSnapshot::for_player(&current.doc, &self.player_id)?)
    }

    pub fn is_my_turn(&self) -> bool {
        self.observed
            .borrow()
            .as_ref()
            .is_some_and(|v| v.doc.is_turn_of(&self.player_id))
    }

    pub fn is_finished(&self) -> bool {
        self.observed
            .borrow()
            .as_ref()
            .is_some_and(|v| v.doc.game_status == GameStatus::Finished)
    }

    /// Wait until the observed state satisfies `pred`, returning that state.
    pub async fn wait_until<P>(&mut self, pred: P) -> Result<Versioned<GameState>, SyncError>
    where
        P: Fn(&GameState) -> bool,
    {
        loop {
            let ready = {
                let observed = self.observed.borrow_and_update();
                observed.as_ref().filter(|v| pred(&v.doc)).cloned()
            };
            if let Some(current) = ready {
                return Ok(current);
            }
            self.observed
                .changed()
                .await
                .map_err(|_| SyncError::internal(format!("room {} store closed", self.room_id)))?;
        }
    }

    /// Wait for my turn or the end of the game.
    pub async fn wait_for_turn(&mut self) -> Result<Versioned<GameState>, SyncError> {
        let me = self.player_id.clone();
        self.wait_until(move |s| s.is_turn_of(&me) || s.game_status == GameStatus::Finished)
            .await
    }

    /// Pick a hand card and list what it could capture on the last seen table.
    pub fn select_card(&mut self, card: Card) -> Result<&[Vec<Card>], SyncError> {
        let current = self.require_state()?;
        let me = current.doc.player(&self.player_id)?;
        if !me.hand.contains(&card) {
            return Err(DomainError::validation(
                ValidationKind::CardNotInHand,
                format!("{card} is not in {}'s hand", self.player_id),
            )
            .into());
        }

        self.selection = Selection {
            card: Some(card),
            candidates: legal_captures(card, &current.doc.table_cards),
            chosen: None,
        };
        Ok(&self.selection.candidates)
    }

    pub fn selected_card(&self) -> Option<Card> {
        self.selection.card
    }

    pub fn candidates(&self) -> &[Vec<Card>] {
        &self.selection.candidates
    }

    /// Choose a capture candidate by index, or `None` to lay the card.
    pub fn choose_candidate(&mut self, index: Option<usize>) -> Result<(), SyncError> {
        if let Some(i) = index {
            if i >= self.selection.candidates.len() {
                return Err(DomainError::validation(
                    ValidationKind::IllegalCapture,
                    format!(
                        "candidate {i} out of range ({} available)",
                        self.selection.candidates.len()
                    ),
                )
                .into());
            }
        }
        self.selection.chosen = index;
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::default();
    }

    /// Submit the current selection. The selection is cleared first, so it
    /// is gone whether the submission commits or fails.
    pub async fn submit(&mut self) -> Result<Commit<MoveOutcome>, SyncError> {
        let selection = std::mem::take(&mut self.selection);
        let played = selection
            .card
            .ok_or_else(|| DomainError::validation_other("No card selected"))?;
        let chosen: Vec<Card> = match selection.chosen {
            Some(i) => selection.candidates.get(i).cloned().unwrap_or_default(),
            None => Vec::new(),
        };

        let current = self.require_state()?;
        if !current.doc.is_turn_of(&self.player_id) {
            return Err(DomainError::validation(
                ValidationKind::OutOfTurn,
                format!("Not {}'s turn in the last observed state", self.player_id),
            )
            .into());
        }
        if !is_legal_capture(played, &chosen, &current.doc.table_cards) {
            return Err(DomainError::validation(
                ValidationKind::IllegalCapture,
                format!("{played} cannot take the selected cards"),
            )
            .into());
        }

        self.service
            .submit_move(&self.room_id, &self.player_id, played, &chosen)
            .await
    }

    /// Select, choose and submit in one call.
    pub async fn play(
        &mut self,
        card: Card,
        candidate: Option<usize>,
    ) -> Result<Commit<MoveOutcome>, SyncError> {
        let prepared = match self.select_card(card) {
            Ok(_) => self.choose_candidate(candidate),
            Err(err) => Err(err),
        };
        if let Err(err) = prepared {
            self.clear_selection();
            return Err(err);
        }
        self.submit().await
    }

    /// Report that the player to move let their turn expire, as of the
    /// last observed state.
    pub async fn report_timeout(&self) -> Result<Commit<TimeoutOutcome>, SyncError> {
        let current = self.require_state()?;
        let idle = current.doc.current_player_id.clone().ok_or_else(|| {
            DomainError::validation(ValidationKind::PhaseMismatch, "Nobody is on turn")
        })?;
        self.service
            .record_timeout(&self.room_id, &idle, current.doc.move_sequence)
            .await
    }

    /// Acknowledge the pending round summary, if there is one I have not
    /// acknowledged yet. Returns `None` when there was nothing to do.
    pub async fn acknowledge_round_score(&self) -> Result<Option<Commit<bool>>, SyncError> {
        let current = self.require_state()?;
        let Some(summary) = &current.doc.last_round_score else {
            return Ok(None);
        };
        let seen = current
            .doc
            .round_acks
            .get(&self.player_id)
            .copied()
            .unwrap_or(0);
        if seen >= summary.round_sequence {
            return Ok(None);
        }
        let commit = self
            .service
            .acknowledge_round_score(&self.room_id, &self.player_id, summary.round_sequence)
            .await?;
        Ok(Some(commit))
    }

    pub async fn forfeit(&self) -> Result<Commit<()>, SyncError> {
        self.service.forfeit(&self.room_id, &self.player_id).await
    }

    fn require_state(&self) -> Result<Versioned<GameState>, SyncError> {
        self.observed
            .borrow()
            .clone()
            .ok_or_else(|| SyncError::room_not_found(self.room_id.clone()))
    }
}
