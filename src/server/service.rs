use may_minihttp::{HttpService, Request, Response};
use std::io;
use std::sync::Arc;
use tracing::debug;

use super::request::from_http;
use super::response::write_response;
use crate::dispatcher::Dispatcher;

/// `may_minihttp` adapter: one [`Dispatcher`] shared by every connection.
///
/// Each connection coroutine holds a clone; the dispatcher and its registry
/// are read-only, so requests never wait on one another.
#[derive(Clone)]
pub struct DispatchService {
    dispatcher: Arc<Dispatcher>,
}

impl DispatchService {
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

impl HttpService for DispatchService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let request = from_http(req);
        let response = self.dispatcher.dispatch(&request);
        debug!(
            request_id = %request.request_id,
            status = response.status,
            body_size_bytes = response.body.len(),
            "Writing response"
        );
        write_response(res, response);
        Ok(())
    }
}
