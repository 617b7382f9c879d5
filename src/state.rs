use crate::client::FlagClient;

#[derive(Clone)]
pub struct AppState {
    pub flags: FlagClient,
}

impl AppState {
    pub fn new(flags: FlagClient) -> Self {
        Self { flags }
    }
}
