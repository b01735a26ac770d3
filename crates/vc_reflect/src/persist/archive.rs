use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::mem;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use crate::Object;
use crate::info::Class;
use crate::persist::de::{Deserializer, ReadState};
use crate::persist::markup::Document;
use crate::persist::parser::parse_stream;
use crate::persist::ser::Serializer;
use crate::persist::status::StatusReporter;
use crate::persist::{AbortHandle, ArchiveConfig, ArchiveError, ArchiveState, ArchiveStatus};
use crate::persist::{ArchiveWarning, CURRENT_VERSION, Outcome, ROOT_TAG, StatusObserver};
use crate::persist::VERSION_ATTRIBUTE;
use crate::registry::TypeRegistry;

// -----------------------------------------------------------------------------
// Archive

/// A markup archive over a stream.
///
/// An archive made with [`Archive::reader`] reads a stream into its list of root
/// objects, one made with [`Archive::writer`] writes its list of root objects. The
/// same value can be used for both if `S` is `Read + Seek + Write`.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use vc_reflect::{Object, impl_reflect_object, registry::TypeRegistry};
/// use vc_reflect::persist::{Archive, Outcome};
///
/// #[derive(Default)]
/// struct Note {
///     text: String,
///     pinned: bool,
/// }
///
/// impl_reflect_object!(Note, "Note", [text, pinned]);
/// impl Object for Note {}
///
/// let mut writer = Archive::writer(Vec::new());
/// writer.set_objects(vec![Box::new(Note { text: "hello".into(), pinned: true })]);
/// assert_eq!(writer.write().unwrap(), Outcome::Complete);
///
/// let mut registry = TypeRegistry::new();
/// registry.register::<Note>();
///
/// let mut reader = Archive::reader(Cursor::new(writer.into_inner()), &registry);
/// assert_eq!(reader.read().unwrap(), Outcome::Complete);
///
/// let note = reader.objects()[0].downcast_ref::<Note>().unwrap();
/// assert_eq!(note.text, "hello");
/// assert!(note.pinned);
/// ```
pub struct Archive<'r, S> {
    stream: S,
    registry: Option<&'r TypeRegistry>,
    config: ArchiveConfig,
    version: u32,
    size: u64,
    progress: u8,
    search_class: Option<&'static Class>,
    objects: Vec<Box<dyn Object>>,
    document: Option<Document>,
    state: ReadState,
    abort: AbortHandle,
    observer: Option<StatusObserver<'r>>,
}

impl<'r, S> Archive<'r, S> {
    fn with_stream(stream: S, registry: Option<&'r TypeRegistry>) -> Self {
        let config = ArchiveConfig::default();
        Self {
            stream,
            registry,
            config,
            version: config.version,
            size: 0,
            progress: 0,
            search_class: None,
            objects: Vec::new(),
            document: None,
            state: ReadState::default(),
            abort: AbortHandle::new(),
            observer: None,
        }
    }

    /// Replaces the configuration, the written version included.
    pub fn with_config(mut self, config: ArchiveConfig) -> Self {
        self.config = config;
        self.version = config.version;
        self
    }

    #[inline]
    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// Sets the class [`Archive::found_search_class`] looks for while reading.
    #[inline]
    pub fn set_search_class(&mut self, class: Option<&'static Class>) {
        self.search_class = class;
    }

    /// Sets the observer of progress events.
    pub fn set_observer(&mut self, observer: impl FnMut(&mut ArchiveStatus) + Send + 'r) {
        self.observer = Some(Box::new(observer));
    }

    /// Returns a handle that cancels the running walk from anywhere.
    ///
    /// The flag is cleared when a walk starts.
    #[inline]
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// The file format version, read from the header or about to be written.
    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[inline]
    pub fn set_version(&mut self, version: u32) {
        self.version = version;
    }

    /// The size in bytes of the parsed stream.
    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The parsed fraction of the stream, `0..=100`.
    #[inline]
    pub fn parse_progress(&self) -> u8 {
        self.progress
    }

    #[inline]
    pub fn objects(&self) -> &[Box<dyn Object>] {
        &self.objects
    }

    #[inline]
    pub fn objects_mut(&mut self) -> &mut Vec<Box<dyn Object>> {
        &mut self.objects
    }

    #[inline]
    pub fn take_objects(&mut self) -> Vec<Box<dyn Object>> {
        mem::take(&mut self.objects)
    }

    #[inline]
    pub fn set_objects(&mut self, objects: Vec<Box<dyn Object>>) {
        self.objects = objects;
    }

    /// The warnings of the last read.
    #[inline]
    pub fn warnings(&self) -> &[ArchiveWarning] {
        &self.state.warnings
    }

    /// Returns `true` if the last read met an object of the search class.
    #[inline]
    pub fn found_search_class(&self) -> bool {
        self.state.found
    }

    /// The parsed document, if any.
    #[inline]
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    #[inline]
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    #[inline]
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S> fmt::Debug for Archive<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Archive")
            .field("config", &self.config)
            .field("version", &self.version)
            .field("size", &self.size)
            .field("objects", &self.objects)
            .field("warnings", &self.state.warnings)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Reading

impl<'r, S: Read + Seek> Archive<'r, S> {
    /// Creates an archive reading `stream`, resolving types through `registry`.
    #[inline]
    pub fn reader(stream: S, registry: &'r TypeRegistry) -> Self {
        Self::with_stream(stream, Some(registry))
    }

    /// Parses the stream and reads every root object into [`Archive::objects`].
    ///
    /// Events: `Starting`, one `ObjectProcessed` per root element and a final one at
    /// 100 (with [`ArchiveFlags::STATUS`](crate::persist::ArchiveFlags::STATUS)), then
    /// `Complete`. A cancelled read keeps the objects read so far.
    pub fn read(&mut self) -> Result<Outcome, ArchiveError> {
        let registry = self.registry.ok_or(ArchiveError::MissingRegistry)?;
        self.abort.reset();
        self.objects.clear();
        self.state = ReadState::default();

        let mut reporter = StatusReporter::new(self.observer.as_mut(), &self.abort, self.config.flags);
        reporter.raise(ArchiveState::Starting, 0);

        let progress = &mut self.progress;
        let parsed = parse_stream(&mut self.stream, self.config.chunk_size, &self.abort, |p| {
            *progress = p;
        })?;
        self.size = parsed.size;
        let Some(document) = parsed.document else {
            return Ok(Outcome::Cancelled);
        };
        self.version = read_version(&document);
        self.state = ReadState::new(document.root());
        let document = self.document.insert(document);

        let mut reader = Deserializer::new(document, registry, &mut self.state, self.search_class, self.version);
        let outcome = reader.deserialize_array(&mut self.objects, Some(&mut reporter))?;
        log::debug!(
            "read {} objects with {} warnings",
            self.objects.len(),
            self.state.warnings.len(),
        );

        if outcome == Outcome::Complete {
            reporter.raise(ArchiveState::Complete, 100);
        }
        Ok(outcome)
    }

    /// Parses the whole stream without reading objects.
    ///
    /// Called by [`Archive::begin_reading_single_objects`] when nothing was parsed yet.
    pub fn parse(&mut self) -> Result<Outcome, ArchiveError> {
        self.abort.reset();
        let progress = &mut self.progress;
        let parsed = parse_stream(&mut self.stream, self.config.chunk_size, &self.abort, |p| {
            *progress = p;
        })?;
        self.size = parsed.size;
        let Some(document) = parsed.document else {
            return Ok(Outcome::Cancelled);
        };
        self.version = read_version(&document);
        self.document = Some(document);
        Ok(Outcome::Complete)
    }

    /// Reads the file format version from the header, parsing the stream first if
    /// `reparse` is set or nothing was parsed yet.
    ///
    /// A missing or unreadable version is taken as [`CURRENT_VERSION`].
    pub fn read_file_header(&mut self, reparse: bool) -> Result<u32, ArchiveError> {
        if (reparse || self.document.is_none()) && self.parse()? == Outcome::Cancelled {
            return Err(ArchiveError::NotParsed);
        }
        let document = self.document.as_ref().ok_or(ArchiveError::NotParsed)?;
        self.version = read_version(document);
        Ok(self.version)
    }

    /// Prepares reading root objects one at a time, parsing the stream if needed.
    ///
    /// Returns `false` if there is no root object to read.
    pub fn begin_reading_single_objects(&mut self) -> Result<bool, ArchiveError> {
        let registry = self.registry.ok_or(ArchiveError::MissingRegistry)?;
        if self.document.is_none() && self.parse()? == Outcome::Cancelled {
            return Ok(false);
        }
        let document = self.document.as_ref().ok_or(ArchiveError::NotParsed)?;
        self.state = ReadState::new(document.root());
        Deserializer::new(document, registry, &mut self.state, self.search_class, self.version)
            .begin_reading()
    }

    /// Reads the next root object, returns it with whether another one follows.
    ///
    /// The object is `None` for a null or unregistered element.
    pub fn read_single_object(&mut self) -> Result<(Option<Box<dyn Object>>, bool), ArchiveError> {
        let registry = self.registry.ok_or(ArchiveError::MissingRegistry)?;
        let document = self.document.as_ref().ok_or(ArchiveError::NotParsed)?;
        if self.state.cursor.current().is_none() {
            return Ok((None, false));
        }
        Deserializer::new(document, registry, &mut self.state, self.search_class, self.version)
            .read_single()
    }
}

fn read_version(document: &Document) -> u32 {
    let Some(root) = document.root() else {
        return CURRENT_VERSION;
    };
    let root = &document[root];
    if root.tag() != ROOT_TAG {
        log::warn!("archive root is `<{}>`, expected `<{ROOT_TAG}>`", root.tag());
    }
    match root.attribute(VERSION_ATTRIBUTE).map(|v| v.trim().parse::<u32>()) {
        Some(Ok(version)) => version,
        Some(Err(_)) | None => {
            log::debug!("archive has no readable `{VERSION_ATTRIBUTE}`, assuming {CURRENT_VERSION}");
            CURRENT_VERSION
        }
    }
}

impl<'r> Archive<'r, BufReader<File>> {
    /// Opens the file at `path` for reading.
    pub fn open(path: impl AsRef<Path>, registry: &'r TypeRegistry) -> Result<Self, ArchiveError> {
        let file = File::open(path)?;
        Ok(Self::reader(BufReader::new(file), registry))
    }
}

// -----------------------------------------------------------------------------
// Writing

impl<'r, S: Write> Archive<'r, S> {
    /// Creates an archive writing into `stream`.
    #[inline]
    pub fn writer(stream: S) -> Self {
        Self::with_stream(stream, None)
    }

    /// Writes [`Archive::objects`], see [`Archive::write_objects`].
    pub fn write(&mut self) -> Result<Outcome, ArchiveError> {
        let objects = mem::take(&mut self.objects);
        let result = self.write_objects(&objects);
        self.objects = objects;
        result
    }

    /// Writes a whole archive holding `objects`.
    ///
    /// A cancelled write leaves the document unterminated.
    pub fn write_objects(&mut self, objects: &[Box<dyn Object>]) -> Result<Outcome, ArchiveError> {
        self.abort.reset();
        let mut reporter = StatusReporter::new(self.observer.as_mut(), &self.abort, self.config.flags);
        reporter.raise(ArchiveState::Starting, 0);

        let mut serializer = Serializer::new(&mut self.stream);
        serializer.write_header(self.version)?;
        let outcome = serializer.serialize_array(objects, &mut reporter)?;
        if outcome == Outcome::Complete {
            serializer.write_footer()?;
        }
        self.stream.flush()?;

        if outcome == Outcome::Complete {
            reporter.raise(ArchiveState::Complete, 100);
        }
        Ok(outcome)
    }

    /// Writes the prolog and opens the root element.
    pub fn write_file_header(&mut self) -> Result<(), ArchiveError> {
        Serializer::new(&mut self.stream).write_header(self.version)
    }

    /// Writes one root object, between [`Archive::write_file_header`] and
    /// [`Archive::write_file_footer`].
    pub fn write_single_object(&mut self, object: &dyn Object) -> Result<(), ArchiveError> {
        Serializer::new(&mut self.stream).serialize_instance(Some(object), None)
    }

    /// Closes the root element and flushes the stream.
    pub fn write_file_footer(&mut self) -> Result<(), ArchiveError> {
        Serializer::new(&mut self.stream).write_footer()?;
        self.stream.flush()?;
        Ok(())
    }
}

impl Archive<'_, BufWriter<File>> {
    /// Creates or truncates the file at `path` for writing.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let file = File::create(path)?;
        Ok(Self::writer(BufWriter::new(file)))
    }
}
