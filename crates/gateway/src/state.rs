use inference::InferenceClient;
use scanner::ScanOrchestrator;

pub struct AppState<C: InferenceClient> {
    pub scanner: ScanOrchestrator<C>,
}

impl<C: InferenceClient> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            scanner: self.scanner.clone(),
        }
    }
}

impl<C: InferenceClient> AppState<C> {
    pub fn new(scanner: ScanOrchestrator<C>) -> Self {
        Self { scanner }
    }
}
