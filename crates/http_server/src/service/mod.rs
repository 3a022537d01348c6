mod writer;

pub use writer::ResponseWriter;

use crate::http::request::Request;

/// Application code invoked once per parsed request.
///
/// The handler owns the whole response: it writes the status line, headers and body as raw
/// bytes. Whatever it writes is flushed to the peer after the returned future completes.
///
/// A single handler is shared by every connection, so calls may run concurrently.
pub trait Handler: Send + Sync + 'static {
    fn serve(
        &self,
        w: &mut ResponseWriter<'_>,
        req: &Request,
    ) -> impl Future<Output = ()> + Send;
}
