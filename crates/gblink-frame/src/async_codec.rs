//! `tokio_util::codec` adapter for link frames.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_frame, encode_frame, Frame};
use crate::error::FrameError;

/// Codec for use with `FramedRead` / `FramedWrite` over async streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkCodec;

impl LinkCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for LinkCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        decode_frame(src)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            None => {
                let len = src.len();
                src.clear();
                Err(FrameError::MalformedFrame { len })
            }
        }
    }
}

impl Encoder<Frame> for LinkCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_frame(&item, dst);
        Ok(())
    }
}

impl Encoder<&Frame> for LinkCodec {
    type Error = FrameError;

    fn encode(&mut self, item: &Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_frame(item, dst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use futures_util::{SinkExt, StreamExt};
    use tokio_util::codec::{FramedRead, FramedWrite};

    use super::*;
    use crate::dissect::DecodedFrame;

    #[tokio::test]
    async fn framed_read_yields_frames() {
        let wire: &[u8] = &[
            0x01, 0x01, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, //
            0x6A, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00, 0x00,
        ];
        let mut framed = FramedRead::new(wire, LinkCodec::new());

        let first = framed.next().await.unwrap().unwrap();
        assert_eq!(first, Frame::new(1, [1, 4, 0], 0));

        let second = framed.next().await.unwrap().unwrap();
        let decoded = DecodedFrame::from_frame(second, Default::default());
        assert_eq!(decoded.summary, "Synchronization, framecount=5, timestamp=0");

        assert!(framed.next().await.is_none());
    }

    #[tokio::test]
    async fn framed_read_reports_truncated_tail() {
        let wire: &[u8] = &[0x68, 0xAB, 0x02, 0x00, 0x00];
        let mut framed = FramedRead::new(wire, LinkCodec::new());

        let err = framed.next().await.unwrap().unwrap_err();
        assert!(matches!(err, FrameError::MalformedFrame { len: 5 }));
    }

    #[tokio::test]
    async fn framed_write_encodes_frames() {
        let mut framed = FramedWrite::new(Vec::new(), LinkCodec::new());
        framed
            .send(Frame::new(104, [0xAB, 0x02, 0x00], 300))
            .await
            .unwrap();
        framed.send(&Frame::new(108, [0, 0, 0], 0)).await.unwrap();

        let wire = framed.into_inner();
        assert_eq!(
            wire,
            vec![
                0x68, 0xAB, 0x02, 0x00, 0x00, 0x00, 0x01, 0x2C, //
                0x6C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            ]
        );
    }

    #[tokio::test]
    async fn roundtrip_over_tcp() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut framed = FramedRead::new(socket, LinkCodec::new());
            framed.next().await.unwrap().unwrap()
        });

        let socket = tokio::net::TcpStream::connect(addr).await.unwrap();
        let mut framed = FramedWrite::new(socket, LinkCodec::new());
        framed
            .send(Frame::new(101, [0x04, 0, 0], 0))
            .await
            .unwrap();

        let frame = server.await.unwrap();
        assert_eq!(frame.command().to_string(), "Button 4 pushed");
    }
}
