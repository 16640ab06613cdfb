//! Client-side selection state as a pure reducer.
//!
//! Searches are tagged with a ticket when they start; a completion carrying
//! anything but the latest ticket is stale and leaves the state untouched.

use crate::documents::DocumentKind;
use crate::models::Student;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchTicket(pub u64);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub results: Vec<Student>,
    pub selected: Option<Student>,
    pub document: Option<DocumentKind>,
    pub searching: bool,
    latest: u64,
}

impl ViewState {
    /// Ticket of the most recently started search, if any.
    pub fn latest_ticket(&self) -> Option<SearchTicket> {
        (self.latest > 0).then_some(SearchTicket(self.latest))
    }

    fn is_current(&self, ticket: SearchTicket) -> bool {
        self.latest_ticket() == Some(ticket)
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    SearchStarted,
    SearchCompleted {
        ticket: SearchTicket,
        results: Vec<Student>,
    },
    SearchFailed {
        ticket: SearchTicket,
    },
    SelectStudent(Option<Student>),
    SelectDocument(Option<DocumentKind>),
}

pub fn reduce(state: &ViewState, action: Action) -> ViewState {
    let mut next = state.clone();
    match action {
        Action::SearchStarted => {
            next.latest += 1;
            next.searching = true;
        }
        Action::SearchCompleted { ticket, results } => {
            if !state.is_current(ticket) {
                return next;
            }
            next.searching = false;
            match results.as_slice() {
                [only] => {
                    if next.selected.as_ref().map(|s| &s.id) != Some(&only.id) {
                        next.document = None;
                    }
                    next.selected = Some(only.clone());
                }
                [] => {}
                _ => {
                    next.selected = None;
                    next.document = None;
                }
            }
            next.results = results;
        }
        Action::SearchFailed { ticket } => {
            if state.is_current(ticket) {
                next.searching = false;
                next.results.clear();
            }
        }
        Action::SelectStudent(student) => {
            next.selected = student;
            next.document = None;
        }
        Action::SelectDocument(kind) => {
            next.document = kind;
        }
    }
    next
}
