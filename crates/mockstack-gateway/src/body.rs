//! Gateway response body type.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body::{Body, Frame, SizeHint};
use http_body_util::Full;

/// Response body shared by every service behind the gateway.
///
/// Every response is a buffered JSON document, so the body is always known
/// up front. The default body is empty.
#[derive(Debug, Default)]
pub struct GatewayBody(Full<Bytes>);

impl From<Vec<u8>> for GatewayBody {
    fn from(json: Vec<u8>) -> Self {
        Self(Full::new(Bytes::from(json)))
    }
}

impl Body for GatewayBody {
    type Data = Bytes;
    type Error = std::io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, std::io::Error>>> {
        Pin::new(&mut self.get_mut().0)
            .poll_frame(cx)
            .map_err(|never| match never {})
    }

    fn is_end_stream(&self) -> bool {
        self.0.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.0.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    #[tokio::test]
    async fn test_should_collect_buffered_body() {
        let body = GatewayBody::from(br#"{"ok":true}"#.to_vec());
        assert_eq!(body.size_hint().exact(), Some(11));

        let bytes = body.collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], br#"{"ok":true}"#);
    }

    #[test]
    fn test_should_report_empty_body_as_ended() {
        let body = GatewayBody::default();
        assert!(body.is_end_stream());
        assert_eq!(body.size_hint().exact(), Some(0));
    }
}
