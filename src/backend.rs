//! The `tower_lsp` language server.
//!
//! [`Backend`] owns the [`SymbolCache`], the text of every open buffer and
//! the current [`Settings`]. Notifications keep the cache current; requests
//! look up the merged symbol table of their document and hand it to the
//! feature modules.
//!
//! Every cache access, including the lazy load inside
//! [`SymbolCache::get`], goes through the write half of the cache lock, so
//! there is a single writer at any time. Locks are taken in the order
//! documents, then cache.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use ropey::Rope;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::{debug, error, info};

use crate::cache::{SymbolCache, SymbolTable};
use crate::config::{ClientSettings, Settings};
use crate::{completion, gotodef, hover, symbol, tokens};

/// Files whose changes on disk can affect a symbol table.
const WATCH_GLOB: &str = "**/*.{s,S,asm,h,inc}";

pub struct Backend {
    client: Client,
    cache: Arc<RwLock<SymbolCache>>,
    documents: Arc<RwLock<HashMap<Url, Rope>>>,
    settings: Arc<RwLock<Settings>>,
    root_dir: Arc<RwLock<Option<PathBuf>>>,
    capabilities: Arc<RwLock<ClientCapabilities>>,
}

impl Backend {
    pub fn new(client: Client) -> Backend {
        Backend {
            client,
            cache: Arc::new(RwLock::new(SymbolCache::new())),
            documents: Arc::new(RwLock::new(HashMap::new())),
            settings: Arc::new(RwLock::new(Settings::default())),
            root_dir: Arc::new(RwLock::new(None)),
            capabilities: Arc::new(RwLock::new(ClientCapabilities::default())),
        }
    }

    /// Rebuild settings from files and `client`, then push the include paths
    /// into the cache. Cached entries are left alone; see
    /// [`Backend::rebuild_cache`].
    async fn bind_settings(&self, client: &ClientSettings) {
        let root_dir = self.root_dir.read().await.clone();
        let capabilities = self.capabilities.read().await.clone();

        let settings_dir = match &root_dir {
            Some(root) => root.clone(),
            None => std::env::current_dir().unwrap_or_default(),
        };
        let settings = match Settings::new(&settings_dir, &capabilities, client) {
            Ok(settings) => settings,
            Err(err) => {
                error!("failed to load settings, using defaults: {err:#}");
                self.client
                    .log_message(MessageType::ERROR, format!("Failed to load settings: {err}"))
                    .await;
                Settings::default()
            }
        };

        let include_paths = settings.resolved_include_paths(root_dir.as_deref());
        info!("include paths: {include_paths:?}");

        self.cache.write().await.set_include_paths(include_paths);
        *self.settings.write().await = settings;
    }

    /// Drop every cache entry and rescan the open buffers.
    async fn rebuild_cache(&self) {
        let documents = self.documents.read().await;
        let mut cache = self.cache.write().await;

        cache.clear();
        for (uri, rope) in documents.iter() {
            cache.update(uri, &rope.to_string());
        }
    }

    async fn update_document(&self, uri: Url, text: String) {
        let rope = Rope::from_str(&text);
        let mut documents = self.documents.write().await;
        documents.insert(uri.clone(), rope);
        self.cache.write().await.update(&uri, &text);
    }

    /// The open buffer for `uri` together with its merged symbol table.
    async fn lookup(&self, uri: &Url) -> Option<(Rope, SymbolTable)> {
        let documents = self.documents.read().await;
        let rope = documents.get(uri)?.clone();
        let table = self.cache.write().await.get(uri);
        Some((rope, table))
    }

    async fn register_file_watchers(&self) {
        let options = DidChangeWatchedFilesRegistrationOptions {
            watchers: vec![FileSystemWatcher {
                glob_pattern: GlobPattern::String(WATCH_GLOB.into()),
                kind: None,
            }],
        };

        let register_options = match serde_json::to_value(options) {
            Ok(value) => value,
            Err(err) => {
                error!("failed to encode watcher registration: {err}");
                return;
            }
        };

        let registration = Registration {
            id: "gas-macro-lsp-file-watcher".into(),
            method: "workspace/didChangeWatchedFiles".into(),
            register_options: Some(register_options),
        };

        if let Err(err) = self.client.register_capability(vec![registration]).await {
            debug!("client refused file watcher registration: {err}");
        }
    }
}

/// A new file may satisfy an include that failed to resolve before, in any
/// cached document. Entries loaded from disk are dropped so they are rescanned
/// on the next lookup; open buffers are rescanned now.
fn rescan_after_create(cache: &mut SymbolCache, documents: &HashMap<Url, Rope>) {
    cache.retain(|uri| documents.contains_key(uri));
    for (uri, rope) in documents {
        cache.update(uri, &rope.to_string());
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        #[allow(deprecated)] // root_uri is still what most clients send
        let root_dir = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .map(|folder| folder.uri.clone())
            .or(params.root_uri.clone())
            .and_then(|uri| uri.to_file_path().ok());

        info!("initializing with workspace root {root_dir:?}");
        *self.root_dir.write().await = root_dir;
        *self.capabilities.write().await = params.capabilities.clone();

        let client_settings = params
            .initialization_options
            .as_ref()
            .map(ClientSettings::from_value)
            .unwrap_or_default();
        self.bind_settings(&client_settings).await;

        let settings = self.settings.read().await;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                definition_provider: Some(OneOf::Left(true)),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(vec!["%".to_string(), "#".to_string()]),
                    ..Default::default()
                }),
                document_symbol_provider: Some(OneOf::Left(true)),
                workspace_symbol_provider: Some(OneOf::Left(true)),
                semantic_tokens_provider: settings.semantic_tokens.then(|| {
                    SemanticTokensServerCapabilities::SemanticTokensOptions(
                        SemanticTokensOptions {
                            legend: tokens::legend(),
                            range: Some(false),
                            full: Some(SemanticTokensFullOptions::Bool(true)),
                            ..Default::default()
                        },
                    )
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.register_file_watchers().await;
        self.client
            .log_message(MessageType::INFO, "GNU assembler macro language server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        info!("shutting down");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        debug!("opened {}", params.text_document.uri);
        self.update_document(params.text_document.uri, params.text_document.text)
            .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // Full sync: the last change carries the whole document.
        if let Some(change) = params.content_changes.into_iter().last() {
            self.update_document(params.text_document.uri, change.text)
                .await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        debug!("closed {uri}");

        let mut documents = self.documents.write().await;
        documents.remove(&uri);
        self.cache.write().await.delete(&uri);
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        let documents = self.documents.read().await;
        let mut cache = self.cache.write().await;

        let mut created = false;
        for event in params.changes {
            if event.typ == FileChangeType::CREATED {
                created = true;
            } else if !documents.contains_key(&event.uri) {
                // Deleted, or changed outside the editor: reload on next use.
                cache.delete(&event.uri);
            }
        }

        if created {
            rescan_after_create(&mut cache, &documents);
        }
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        let client_settings = ClientSettings::from_value(&params.settings);
        debug!("configuration changed: {client_settings:?}");

        self.bind_settings(&client_settings).await;
        self.rebuild_cache().await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let Some((rope, table)) = self.lookup(uri).await else {
            return Ok(None);
        };

        let settings = self.settings.read().await;
        let root_dir = self.root_dir.read().await;

        Ok(hover::hover(
            &table,
            &rope,
            &params,
            &settings,
            root_dir.as_deref(),
        ))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let Some((rope, table)) = self.lookup(uri).await else {
            return Ok(None);
        };

        let settings = self.settings.read().await;
        Ok(completion::get_completions(&table, &rope, &params, &settings))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let position = params.text_document_position_params.position;
        let uri = &params.text_document_position_params.text_document.uri;
        let Some((rope, table)) = self.lookup(uri).await else {
            return Ok(None);
        };

        Ok(gotodef::goto_definition(&table, &rope, position).map(GotoDefinitionResponse::Array))
    }

    async fn semantic_tokens_full(
        &self,
        params: SemanticTokensParams,
    ) -> Result<Option<SemanticTokensResult>> {
        if !self.settings.read().await.semantic_tokens {
            return Ok(None);
        }

        let Some((rope, table)) = self.lookup(&params.text_document.uri).await else {
            return Ok(None);
        };

        Ok(Some(tokens::semantic_tokens_full(&table, &rope)))
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let uri = &params.text_document.uri;
        let table = self.cache.write().await.get(uri);

        Ok(symbol::document_symbol(&table, uri))
    }

    async fn symbol(
        &self,
        params: WorkspaceSymbolParams,
    ) -> Result<Option<Vec<SymbolInformation>>> {
        let cache = self.cache.read().await;
        Ok(symbol::workspace_symbol(&cache, &params))
    }
}
