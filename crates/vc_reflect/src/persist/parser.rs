use std::io::{self, BufReader, Read, Seek, SeekFrom};

use crate::persist::markup::{Document, DocumentBuilder};
use crate::persist::{AbortHandle, ArchiveError, StreamError};

/// Bytes read from the stream per parse step.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// The result of parsing a whole stream.
pub(crate) struct Parsed {
    pub size: u64,
    /// `None` if an abort was requested.
    pub document: Option<Document>,
}

/// Parses the whole of `stream` into a [`Document`], chunk by chunk.
///
/// `progress` receives the consumed fraction of the stream, `0..=100`.
pub(crate) fn parse_stream<R: Read + Seek>(
    stream: &mut R,
    chunk_size: usize,
    abort: &AbortHandle,
    progress: impl FnMut(u8),
) -> Result<Parsed, ArchiveError> {
    let size = stream.seek(SeekFrom::End(0))?;
    stream.seek(SeekFrom::Start(0))?;
    if size == 0 {
        return Err(StreamError::Empty.into());
    }
    log::debug!("parsing {size} bytes in chunks of {chunk_size}");

    let chunk_size = chunk_size.max(1);
    let chunks = Chunks {
        stream,
        chunk_size,
        size,
        consumed: 0,
        abort,
        progress,
    };
    let result = DocumentBuilder::new().parse(BufReader::with_capacity(chunk_size, chunks));

    // An abort ends the input early, whatever the builder made of it is dropped.
    if abort.is_aborted() {
        log::debug!("parsing cancelled");
        return Ok(Parsed { size, document: None });
    }
    Ok(Parsed {
        size,
        document: Some(result?),
    })
}

// -----------------------------------------------------------------------------
// Chunks

/// Serves `stream` in reads of at most `chunk_size` bytes.
///
/// Each read reports progress, an abort turns the next read into the end of input.
struct Chunks<'a, R, P> {
    stream: &'a mut R,
    chunk_size: usize,
    size: u64,
    consumed: u64,
    abort: &'a AbortHandle,
    progress: P,
}

impl<R: Read, P: FnMut(u8)> Read for Chunks<'_, R, P> {
    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        if self.abort.is_aborted() {
            return Ok(0);
        }
        let limit = buffer.len().min(self.chunk_size);
        let read = loop {
            match self.stream.read(&mut buffer[..limit]) {
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                result => break result?,
            }
        };
        self.consumed += read as u64;
        (self.progress)((self.consumed.min(self.size) * 100 / self.size) as u8);
        Ok(read)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;
    use std::io::{Cursor, Read, Seek, SeekFrom};

    use super::parse_stream;
    use crate::persist::{AbortHandle, ArchiveError, StreamError};

    #[test]
    fn empty_stream() {
        let mut stream = Cursor::new(Vec::new());
        let result = parse_stream(&mut stream, 16, &AbortHandle::new(), |_| {});
        assert!(matches!(result, Err(ArchiveError::Stream(StreamError::Empty))));
    }

    #[test]
    fn progress_reaches_100() {
        let text = "<Reflect><Object Type=\"u8\"><![CDATA[1]]></Object></Reflect>";
        let mut stream = Cursor::new(text.as_bytes());
        let mut seen = Vec::new();
        let parsed = parse_stream(&mut stream, 8, &AbortHandle::new(), |p| seen.push(p)).unwrap();

        assert_eq!(parsed.size, text.len() as u64);
        assert!(parsed.document.is_some());
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(seen.last(), Some(&100));
    }

    #[test]
    fn exact_multiple_of_chunk_size() {
        let text = "<a><b/></a>";
        let mut stream = Cursor::new(text.as_bytes());
        let parsed = parse_stream(&mut stream, text.len(), &AbortHandle::new(), |_| {}).unwrap();
        assert_eq!(parsed.document.unwrap().len(), 2);
    }

    #[test]
    fn abort_stops_parsing() {
        let abort = AbortHandle::new();
        abort.abort();
        let mut stream = Cursor::new(b"<a/>".as_slice());
        let parsed = parse_stream(&mut stream, 2, &abort, |_| {}).unwrap();
        assert!(parsed.document.is_none());
    }

    #[test]
    fn reads_are_chunk_sized() {
        struct Recording<'a> {
            inner: Cursor<&'a [u8]>,
            reads: Vec<usize>,
        }
        impl Read for Recording<'_> {
            fn read(&mut self, buffer: &mut [u8]) -> std::io::Result<usize> {
                let read = self.inner.read(buffer)?;
                self.reads.push(read);
                Ok(read)
            }
        }
        impl Seek for Recording<'_> {
            fn seek(&mut self, position: SeekFrom) -> std::io::Result<u64> {
                self.inner.seek(position)
            }
        }

        let text = "<a><b>some text</b><c/></a>";
        let mut stream = Recording {
            inner: Cursor::new(text.as_bytes()),
            reads: Vec::new(),
        };
        let parsed = parse_stream(&mut stream, 4, &AbortHandle::new(), |_| {}).unwrap();
        assert_eq!(parsed.document.unwrap().len(), 3);
        assert!(stream.reads.iter().all(|&read| read <= 4));
        assert_eq!(stream.reads.iter().sum::<usize>(), text.len());
    }
}
