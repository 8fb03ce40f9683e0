use url::Url;

use super::*;

/// Source tag → retriever lookup.
///
/// [`RetrieverRegistry::default`] holds every built-in source. Registering a retriever under a
/// tag that is already present replaces the previous one.
///
/// # Examples
///
/// ```
/// use evidence::retriever::RetrieverRegistry;
///
/// let registry = RetrieverRegistry::default().with_config_str(
///   r#"
///     source = "nature"
///     license = "nature"
///     pattern = 'nature.com/articles/([a-zA-Z0-9\-]+)'
///     url_template = "https://www.nature.com/articles/{id}"
///   "#,
/// )?;
///
/// let url = "https://www.nature.com/articles/s41586-021-03819-2";
/// let source = registry.infer_source_from_url(url)?;
/// assert_eq!(source, "nature");
/// assert_eq!(registry.id_from_url(None, url)?, "s41586-021-03819-2");
/// assert_eq!(registry.license_for("nature"), "nature");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct RetrieverRegistry {
  /// Retrievers keyed by lower-case source tag
  retrievers: BTreeMap<String, Arc<dyn Retriever>>,
}

impl Default for RetrieverRegistry {
  fn default() -> Self { Self::with_defaults() }
}

impl RetrieverRegistry {
  /// An empty registry.
  pub fn new() -> Self { Self { retrievers: BTreeMap::new() } }

  /// A registry holding every built-in source.
  pub fn with_defaults() -> Self {
    let mut registry = Self::new();
    registry.register(ArxivRetriever::default());
    registry.register(AclRetriever::default());
    registry.register(WikipediaRetriever::default());
    registry.register(PubmedRetriever);
    registry.register(MaterialsRetriever::default());
    for config in pattern::BUILTIN_CONFIGS {
      match PatternRetriever::from_toml(config) {
        Ok(retriever) => {
          registry.register(retriever);
        },
        Err(e) => warn!("Skipping invalid built-in retriever definition: {e}"),
      }
    }
    registry
  }

  /// Registers `retriever` under its source tag, returning the one it replaced.
  pub fn register(&mut self, retriever: impl Retriever + 'static) -> Option<Arc<dyn Retriever>> {
    self.register_arc(Arc::new(retriever))
  }

  /// Registers an already shared retriever.
  pub fn register_arc(&mut self, retriever: Arc<dyn Retriever>) -> Option<Arc<dyn Retriever>> {
    let source = retriever.source().to_lowercase();
    debug!("Registering retriever for {source}");
    self.retrievers.insert(source, retriever)
  }

  /// Builder form of [`RetrieverRegistry::register`].
  pub fn with_retriever(mut self, retriever: impl Retriever + 'static) -> Self {
    self.register(retriever);
    self
  }

  /// Adds a [`PatternRetriever`] defined by a TOML string.
  pub fn with_config_str(mut self, toml_str: &str) -> Result<Self> {
    self.register(PatternRetriever::from_toml(toml_str)?);
    Ok(self)
  }

  /// Adds a [`PatternRetriever`] defined by a TOML file.
  pub fn with_config_file(self, path: impl AsRef<Path>) -> Result<Self> {
    let content = fs::read_to_string(path)?;
    self.with_config_str(&content)
  }

  /// Adds every `*.toml` definition in a directory, in file name order.
  pub fn with_config_dir(self, dir: impl AsRef<Path>) -> Result<Self> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
      return Err(EvidenceError::Config(format!(
        "Retriever config directory not found: {}",
        dir.display()
      )));
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
      let path = entry?.path();
      if path.extension().is_some_and(|ext| ext == "toml") {
        paths.push(path);
      }
    }
    paths.sort();

    let mut registry = self;
    for path in paths {
      registry = registry.with_config_file(path)?;
    }
    Ok(registry)
  }

  /// The retriever for a source tag, matched case-insensitively.
  pub fn resolve(&self, source: &str) -> Result<Arc<dyn Retriever>> {
    self
      .retrievers
      .get(&source.to_lowercase())
      .cloned()
      .ok_or_else(|| EvidenceError::UnknownSource(source.to_string()))
  }

  /// Registered source tags, sorted.
  pub fn sources(&self) -> impl Iterator<Item = &str> { self.retrievers.keys().map(String::as_str) }

  /// Guesses the source tag of a URL from the second-to-last label of its host.
  ///
  /// `https://arxiv.org/abs/1809.09600` gives `"arxiv"`. The guess is not checked against the
  /// registry; hosts whose name differs from their tag (e.g. `aclanthology.org`) yield a tag
  /// that [`RetrieverRegistry::resolve`] rejects.
  pub fn infer_source_from_url(&self, url: &str) -> Result<String> {
    let invalid = || EvidenceError::InvalidUrlFormat { tag: "url".to_string(), url: url.to_string() };
    let parsed = Url::parse(url).map_err(|_| invalid())?;
    let host = parsed.host_str().ok_or_else(invalid)?;
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
      return Err(invalid());
    }
    Ok(labels[labels.len() - 2].to_lowercase())
  }

  /// Extracts the identifier from `url` with the retriever for `source`, inferring the source
  /// from the URL when none is given.
  pub fn id_from_url(&self, source: Option<&str>, url: &str) -> Result<String> {
    let source = match source {
      Some(source) => source.to_string(),
      None => self.infer_source_from_url(url)?,
    };
    self.resolve(&source)?.id_from_url(url)
  }

  /// The default license of a source, [`UNKNOWN_LICENSE`] for unregistered sources.
  pub fn license_for(&self, source: &str) -> String {
    self.resolve(source).map_or_else(|_| UNKNOWN_LICENSE.to_string(), |r| r.license().to_string())
  }
}
