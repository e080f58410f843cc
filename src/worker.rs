//! Runs a placement on a background thread and reports over a channel.
//!
//! The worker sends any number of [`WorkerMessage::Progress`] messages and
//! then exactly one `Done` or `Failed`. Dropping the handle abandons the run:
//! the engine finishes on its own and its messages go nowhere.

use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::config::Settings;
use crate::engine::{place_with_progress, Progress};
use crate::error::PlacementError;
use crate::model::entity::Occupant;
use crate::model::result::PlacementResult;
use crate::model::room::Room;

#[derive(Debug, Clone)]
pub struct PlacementRequest {
    pub occupants: Vec<Occupant>,
    pub rooms: Vec<Room>,
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkerMessage {
    Progress(Progress),
    Done(PlacementResult),
    Failed(PlacementError),
}

pub struct PlacementHandle {
    receiver: Receiver<WorkerMessage>,
    thread: Option<JoinHandle<()>>,
}

pub fn spawn_placement(request: PlacementRequest) -> PlacementHandle {
    let (sender, receiver) = mpsc::channel();
    let thread = thread::spawn(move || {
        let progress_sender = sender.clone();
        let outcome = place_with_progress(&request.occupants, &request.rooms, &request.settings, |progress| {
            // receiver may be gone; the run is simply abandoned
            let _ = progress_sender.send(WorkerMessage::Progress(progress));
        });
        let message = match outcome {
            Ok(result) => WorkerMessage::Done(result),
            Err(err) => WorkerMessage::Failed(err),
        };
        if sender.send(message).is_err() {
            debug!("placement result discarded, caller went away");
        }
    });
    PlacementHandle { receiver, thread: Some(thread) }
}

impl PlacementHandle {
    /// Messages as they arrive; ends after the terminal message.
    pub fn messages(&self) -> impl Iterator<Item = WorkerMessage> + '_ {
        self.receiver.iter()
    }

    /// Blocks until the run ends, passing progress to `on_progress`.
    pub fn wait_with(mut self, mut on_progress: impl FnMut(Progress)) -> Result<PlacementResult, PlacementError> {
        let mut outcome = Err(PlacementError::WorkerStopped);
        for message in self.receiver.iter() {
            match message {
                WorkerMessage::Progress(progress) => on_progress(progress),
                WorkerMessage::Done(result) => {
                    outcome = Ok(result);
                    break;
                }
                WorkerMessage::Failed(err) => {
                    outcome = Err(err);
                    break;
                }
            }
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                return Err(PlacementError::WorkerStopped);
            }
        }
        outcome
    }

    pub fn wait(self) -> Result<PlacementResult, PlacementError> {
        self.wait_with(|_| {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InputError;

    fn request(occupants: Vec<Occupant>) -> PlacementRequest {
        PlacementRequest {
            occupants,
            rooms: vec![Room::grid(1, "A101", &[(2, 3)])],
            settings: Settings::default(),
        }
    }

    #[test]
    fn test_progress_then_single_result() {
        let occupants = vec![
            Occupant::new(1, "Ada", "Lovelace", "1", "9-A", "F"),
            Occupant::new(2, "Alan", "Turing", "2", "10-A", "M"),
        ];
        let handle = spawn_placement(request(occupants.clone()));
        let messages: Vec<WorkerMessage> = handle.messages().collect();

        let (last, rest) = messages.split_last().unwrap();
        assert!(!rest.is_empty());
        assert!(rest.iter().all(|m| matches!(m, WorkerMessage::Progress(_))));
        match last {
            WorkerMessage::Done(result) => {
                let direct = crate::engine::place(&occupants, &request(Vec::new()).rooms, &Settings::default()).unwrap();
                assert_eq!(result, &direct);
            }
            other => panic!("unexpected terminal message {other:?}"),
        }
    }

    #[test]
    fn test_input_error_is_reported() {
        let twins = vec![
            Occupant::new(1, "Ada", "Lovelace", "1", "9-A", "F"),
            Occupant::new(1, "Ada", "Byron", "2", "9-A", "F"),
        ];
        let mut progress = 0;
        let outcome = spawn_placement(request(twins)).wait_with(|_| progress += 1);
        assert_eq!(outcome, Err(PlacementError::Input(InputError::DuplicateOccupant(1))));
        assert_eq!(progress, 0);
    }
}
