use tracing::{debug, info, warn};

use crate::models::{JobDetail, JobSummary, Outcome};

/// One entry in the job list. The four flags are independent and, once set
/// by a confirmed backend response, never cleared.
#[derive(Debug, Clone)]
pub struct Card {
    pub id: i64,
    pub title: String,
    pub company: Option<String>,
    pub applied: bool,
    pub rejected: bool,
    pub interview: bool,
    pub hidden: bool,
}

impl Card {
    fn from_summary(job: JobSummary) -> Self {
        Self {
            id: job.id,
            title: job.title,
            company: job.company,
            applied: job.applied,
            rejected: job.rejected,
            interview: job.interview,
            hidden: job.hidden,
        }
    }
}

/// Request work the board needs carried out. The board never performs I/O
/// itself; the caller dispatches these and feeds results back in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchDetail { job_id: i64, token: u64 },
}

/// Client-side state of the job board: the card list, the single selection,
/// the detail pane content, and the sequencing token for detail fetches.
///
/// Selection is eager: `select` moves the highlight immediately and hands
/// back a fetch command; the pane keeps its previous content until
/// `detail_arrived` replaces it wholesale. Each fetch carries a fresh token
/// so a response that resolves after a newer selection is dropped instead of
/// overwriting the pane out of order.
pub struct Board {
    cards: Vec<Card>,
    selected: Option<i64>,
    detail: Option<JobDetail>,
    detail_token: u64,
}

impl Board {
    pub fn new(jobs: Vec<JobSummary>) -> Self {
        Self {
            cards: jobs.into_iter().map(Card::from_summary).collect(),
            selected: None,
            detail: None,
            detail_token: 0,
        }
    }

    /// Cards still shown in the list, in backend order.
    pub fn visible(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(|c| !c.hidden)
    }

    pub fn selected_id(&self) -> Option<i64> {
        self.selected
    }

    pub fn detail(&self) -> Option<&JobDetail> {
        self.detail.as_ref()
    }

    fn card_mut(&mut self, job_id: i64) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id == job_id)
    }

    /// Make `job_id` the selection and request its detail. Ignored with a
    /// warning when no visible card matches.
    pub fn select(&mut self, job_id: i64) -> Option<Command> {
        if !self.cards.iter().any(|c| c.id == job_id && !c.hidden) {
            warn!(job_id, "select ignored: no visible card with this id");
            return None;
        }

        info!(job_id, "showing job details");
        self.selected = Some(job_id);
        self.detail_token += 1;
        Some(Command::FetchDetail {
            job_id,
            token: self.detail_token,
        })
    }

    /// Install a fetched detail as the entire pane content. A response whose
    /// token is not the latest issued belongs to a superseded selection and
    /// is discarded. Returns whether the pane was replaced.
    pub fn detail_arrived(&mut self, token: u64, detail: JobDetail) -> bool {
        if token != self.detail_token {
            debug!(token, job_id = detail.id, "discarding stale detail response");
            return false;
        }
        self.detail = Some(detail);
        true
    }

    /// Apply a confirmed mark result. A failed request changes nothing; a
    /// repeated success is a no-op since the flag is already set.
    pub fn outcome_result(&mut self, job_id: i64, outcome: Outcome, ok: bool) {
        if !ok {
            warn!(job_id, outcome = outcome.label(), "backend refused status change");
            return;
        }
        let Some(card) = self.card_mut(job_id) else {
            warn!(job_id, "mark result for unknown card ignored");
            return;
        };
        match outcome {
            Outcome::Applied => card.applied = true,
            Outcome::Rejected => card.rejected = true,
            Outcome::Interview => card.interview = true,
        }
    }

    /// Apply a confirmed hide result: the successor (next visible card after
    /// the hidden one, in list order) is computed before the card goes
    /// hidden, then selected. With no successor the pane and selection are
    /// cleared.
    pub fn hide_result(&mut self, job_id: i64, ok: bool) -> Option<Command> {
        if !ok {
            warn!(job_id, "backend refused hide");
            return None;
        }
        let Some(pos) = self.cards.iter().position(|c| c.id == job_id) else {
            warn!(job_id, "hide result for unknown card ignored");
            return None;
        };

        let successor = self.cards[pos + 1..].iter().find(|c| !c.hidden).map(|c| c.id);
        self.cards[pos].hidden = true;

        match successor {
            Some(next_id) => self.select(next_id),
            None => {
                self.selected = None;
                self.detail = None;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: i64, title: &str) -> JobSummary {
        JobSummary {
            id,
            title: title.to_string(),
            company: Some("Acme".to_string()),
            location: Some("Remote".to_string()),
            date: None,
            applied: false,
            rejected: false,
            interview: false,
            hidden: false,
        }
    }

    fn detail(id: i64) -> JobDetail {
        JobDetail {
            id,
            title: format!("Job {}", id),
            job_url: Some("https://example.com/apply".to_string()),
            company: Some("Acme".to_string()),
            location: Some("Remote".to_string()),
            date: None,
            job_description: Some("Build things.".to_string()),
        }
    }

    fn board_with(ids: &[i64]) -> Board {
        Board::new(ids.iter().map(|&id| summary(id, "Engineer")).collect())
    }

    fn visible_ids(board: &Board) -> Vec<i64> {
        board.visible().map(|c| c.id).collect()
    }

    #[test]
    fn test_select_moves_the_single_selection() {
        let mut board = board_with(&[10, 11, 12]);
        board.select(10);
        assert_eq!(board.selected_id(), Some(10));
        board.select(11);
        assert_eq!(board.selected_id(), Some(11));
    }

    #[test]
    fn test_select_returns_fetch_with_fresh_token() {
        let mut board = board_with(&[10, 11]);
        let first = board.select(10).unwrap();
        let second = board.select(11).unwrap();
        let Command::FetchDetail { job_id, token } = second;
        assert_eq!(job_id, 11);
        let Command::FetchDetail { token: prev, .. } = first;
        assert!(token > prev);
    }

    #[test]
    fn test_select_unknown_id_is_noop() {
        let mut board = board_with(&[10]);
        board.select(10);
        assert!(board.select(99).is_none());
        assert_eq!(board.selected_id(), Some(10));
    }

    #[test]
    fn test_select_hidden_card_is_noop() {
        let mut board = board_with(&[10, 11]);
        board.hide_result(11, true);
        assert!(board.select(11).is_none());
    }

    #[test]
    fn test_detail_arrived_fills_pane() {
        let mut board = board_with(&[10]);
        let Some(Command::FetchDetail { token, .. }) = board.select(10) else {
            panic!("expected fetch command");
        };
        board.detail_arrived(token, detail(10));
        assert_eq!(board.detail().unwrap().id, 10);
        assert_eq!(board.detail().unwrap().id, board.selected_id().unwrap());
    }

    #[test]
    fn test_stale_detail_response_is_discarded() {
        let mut board = board_with(&[10, 11]);
        let Some(Command::FetchDetail { token: old, .. }) = board.select(10) else {
            panic!("expected fetch command");
        };
        let Some(Command::FetchDetail { token: new, .. }) = board.select(11) else {
            panic!("expected fetch command");
        };

        // Responses resolve out of order: the newer selection's detail lands
        // first, then the superseded one tries to overwrite it.
        assert!(board.detail_arrived(new, detail(11)));
        assert!(!board.detail_arrived(old, detail(10)));
        assert_eq!(board.detail().unwrap().id, 11);
    }

    #[test]
    fn test_outcome_success_flags_only_the_target() {
        let mut board = board_with(&[10, 11]);
        board.select(11);
        board.outcome_result(11, Outcome::Applied, true);

        let card = board.visible().find(|c| c.id == 11).unwrap();
        assert!(card.applied && !card.rejected && !card.interview);
        let other = board.visible().find(|c| c.id == 10).unwrap();
        assert!(!other.applied && !other.rejected && !other.interview);
        assert_eq!(board.selected_id(), Some(11));
    }

    #[test]
    fn test_outcome_failure_changes_nothing() {
        let mut board = board_with(&[10]);
        board.outcome_result(10, Outcome::Rejected, false);
        let card = board.visible().next().unwrap();
        assert!(!card.rejected);
    }

    #[test]
    fn test_outcome_success_is_idempotent() {
        let mut board = board_with(&[10]);
        board.outcome_result(10, Outcome::Applied, true);
        board.outcome_result(10, Outcome::Applied, true);
        let card = board.visible().next().unwrap();
        assert!(card.applied);
        assert!(!card.rejected && !card.interview && !card.hidden);
    }

    #[test]
    fn test_hide_cascades_selection_to_next_card() {
        let mut board = board_with(&[10, 11, 12]);
        board.select(11);

        let command = board.hide_result(11, true);
        assert_eq!(board.selected_id(), Some(12));
        assert_eq!(visible_ids(&board), vec![10, 12]);
        let Some(Command::FetchDetail { job_id, .. }) = command else {
            panic!("expected a detail fetch for the successor");
        };
        assert_eq!(job_id, 12);
    }

    #[test]
    fn test_hide_skips_hidden_cards_when_finding_successor() {
        let mut board = board_with(&[10, 11, 12]);
        board.hide_result(11, true);

        let command = board.hide_result(10, true);
        assert_eq!(board.selected_id(), Some(12));
        let Some(Command::FetchDetail { job_id, .. }) = command else {
            panic!("expected a detail fetch for the successor");
        };
        assert_eq!(job_id, 12);
    }

    #[test]
    fn test_hide_last_card_clears_pane_and_selection() {
        let mut board = board_with(&[10, 11, 12]);
        board.select(11);
        board.hide_result(11, true);
        board.hide_result(10, true);

        // "12" is the last visible card.
        let command = board.hide_result(12, true);
        assert!(command.is_none());
        assert!(board.selected_id().is_none());
        assert!(board.detail().is_none());
        assert!(visible_ids(&board).is_empty());
    }

    #[test]
    fn test_hide_failure_changes_nothing() {
        let mut board = board_with(&[10, 11]);
        board.select(10);
        assert!(board.hide_result(10, false).is_none());
        assert_eq!(board.selected_id(), Some(10));
        assert_eq!(visible_ids(&board), vec![10, 11]);
    }

    #[test]
    fn test_jobs_seeded_hidden_never_show() {
        let mut jobs = vec![summary(10, "A"), summary(11, "B")];
        jobs[1].hidden = true;
        let board = Board::new(jobs);
        assert_eq!(visible_ids(&board), vec![10]);
    }
}
