use perron::board::{Board, Scheduler};

pub struct AppState {
    pub board: Board,
    pub scheduler: Scheduler,
}

impl AppState {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            scheduler: Scheduler::new(),
        }
    }
}
