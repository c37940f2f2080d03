use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use iced::keyboard::{self, Key, Modifiers};
use iced::widget::image::Handle;
use iced::widget::{column, container, text};
use iced::{Element, Length, Subscription, Task, Theme};
use image::DynamicImage;
use rfd::FileDialog;

mod color;
mod config;
mod interchange;
mod media;
mod remote;
mod render;
mod state;
mod store;
mod ui;

use config::AppConfig;
use remote::{FamilyGroup, InviteCode, JoinResult, MemberRole, RemoteBoards, RemoteError, SupabaseClient};
use render::TransformSession;
use state::data::{now_millis, Board, Card, CardCategory, UserIdentity};
use state::editor::BoardEditor;
use state::stats::{BoardFilter, UsageStats};
use store::{BoardStore, SyncOutcome};
use ui::auth::AuthForm;
use ui::board_grid::GridMode;
use ui::card_form::CardForm;
use ui::family::FamilyState;
use ui::{PictureState, Pictures};

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Home,
    Editor,
    Print,
    Auth,
    Family,
    Stats,
}

/// Main application state
struct PecsBoard {
    /// Dual-write board persistence
    store: BoardStore,
    /// Hosted backend, when configured
    remote: Option<SupabaseClient>,
    http: reqwest::Client,
    user: Option<UserIdentity>,
    boards: Vec<Board>,
    search: String,
    screen: Screen,
    /// The open board and its undo history
    editor: Option<BoardEditor>,
    grid_mode: GridMode,
    card_form: Option<CardForm>,
    /// Card waiting for a destination board
    copying_card: Option<String>,
    /// Picture editor for the card being edited
    transform: Option<TransformSession>,
    transform_frame: Option<Handle>,
    pictures: Pictures,
    auth: AuthForm,
    family: FamilyState,
    /// Boards covered by the usage screen
    stats_filter: BoardFilter,
    /// Status line shown at the bottom of every screen
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    // ---- board list ----
    BoardsLoaded(Result<SyncOutcome<Vec<Board>>, String>),
    RefreshBoards,
    SearchChanged(String),
    NewBoard,
    OpenBoard(String),
    DuplicateBoard(String),
    DeleteBoard(String),
    BoardDeleted(Result<SyncOutcome<()>, String>),
    BoardSaved(Result<SyncOutcome<()>, String>),
    ImportBoard,
    BoardImported(Result<Board, String>),
    ExportBoard,
    BoardExported(Result<PathBuf, String>),

    // ---- navigation ----
    ShowHome,
    ShowEditor,
    ShowPrint,
    ShowAuth,
    ShowFamily,
    ShowStats,
    StatsFilterSelected(BoardFilter),

    // ---- board editor ----
    Undo,
    Redo,
    SetGridMode(GridMode),
    TitleChanged(String),
    ColumnsSelected(u32),
    GapChanged(u32),
    BackgroundSelected(String),
    ShareBoard(Option<String>),
    AddCard,
    EditCard(String),
    DuplicateCard(String),
    /// Pick a destination board for a card
    ChooseCopyTarget(String),
    /// Copy a card (first id) into another board (second id)
    CopyCardTo(String, String),
    CancelCopyCard,
    RemoveCard(String),
    MoveCard(usize, usize),
    CardUsed(String),

    // ---- card form ----
    CardLabelChanged(String),
    CardImageUrlChanged(String),
    CardCategorySelected(Option<CardCategory>),
    ChooseCardImage,
    CardImageUploaded(Result<SyncOutcome<String>, String>),
    SaveCard,
    CancelCard,
    PictureLoaded(String, Result<Handle, String>),

    // ---- picture editor ----
    OpenTransform,
    TransformSourceLoaded(Result<Arc<DynamicImage>, String>),
    ZoomChanged(f64),
    /// Wheel zoom step
    Zoom(f64),
    BrightnessChanged(f64),
    ContrastChanged(f64),
    Rotate(f64),
    ResetRotation,
    ResetTransform,
    PointerDown(f32, f32),
    PointerMoved(f32, f32),
    PointerUp,
    /// Display frame tick while a redraw is pending
    Frame,
    ApplyTransform,
    CancelTransform,

    // ---- identity ----
    AuthEmailChanged(String),
    AuthPasswordChanged(String),
    AuthNameChanged(String),
    ToggleAuthMode,
    SubmitAuth,
    AuthFinished(Result<Option<UserIdentity>, String>),
    SignOut,
    SignedOut(Result<(), String>),

    // ---- family groups ----
    FamilyLoaded(Result<Vec<FamilyGroup>, String>),
    GroupNameChanged(String),
    CreateGroup,
    JoinCodeChanged(String),
    JoinGroup,
    MemberEmailChanged(String),
    AddMember(String),
    Joined(Result<JoinResult, String>),
    GenerateInvite(String, String),
    InviteGenerated(Result<(String, InviteCode), String>),
    RemoveMember(String),
    SetMemberRole(String, MemberRole),
    DeleteGroup(String),
    FamilyUpdated(Result<(), String>),
}

impl PecsBoard {
    fn new(config: AppConfig) -> (Self, Task<Message>) {
        let http = reqwest::Client::new();
        let remote = config
            .supabase
            .clone()
            .map(|settings| SupabaseClient::with_client(http.clone(), settings));
        let remote_boards = remote
            .clone()
            .map(|client| Arc::new(client) as Arc<dyn RemoteBoards>);
        let store = BoardStore::new(config.db_path.clone(), remote_boards);

        log::info!(
            "🎨 PECS Board starting (cache: {}, backend: {})",
            config.db_path.display(),
            if config.remote_enabled() { "enabled" } else { "offline" }
        );

        let app = PecsBoard {
            store,
            screen: if remote.is_some() { Screen::Auth } else { Screen::Home },
            remote,
            http,
            user: None,
            boards: Vec::new(),
            search: String::new(),
            editor: None,
            grid_mode: GridMode::Edit,
            card_form: None,
            copying_card: None,
            transform: None,
            transform_frame: None,
            pictures: Pictures::new(),
            auth: AuthForm::default(),
            family: FamilyState::default(),
            stats_filter: BoardFilter::All,
            status: "Loading boards…".to_string(),
        };
        let task = app.load_boards();
        (app, task)
    }

    fn owner(&self) -> Option<String> {
        self.user.as_ref().map(|u| u.id.clone())
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            // ---- board list ----
            Message::BoardsLoaded(Ok(outcome)) => {
                let what = format!("{} boards", outcome.value().len());
                self.note_outcome(&what, &outcome);
                self.boards = outcome.into_value();
                Task::none()
            }
            Message::BoardsLoaded(Err(e)) | Message::BoardImported(Err(e)) => {
                log::error!("❌ {e}");
                self.status = format!("❌ {e}");
                Task::none()
            }
            Message::RefreshBoards => {
                self.status = "Loading boards…".to_string();
                self.load_boards()
            }
            Message::SearchChanged(query) => {
                self.search = query;
                Task::none()
            }
            Message::NewBoard => {
                let mut board = Board::new("New Board");
                board.user_id = self.owner();
                self.boards.insert(0, board.clone());
                self.open_editor(board.clone());
                self.save_board(board)
            }
            Message::OpenBoard(id) => {
                let Some(board) = self.boards.iter().find(|b| b.id == id).cloned() else {
                    return Task::none();
                };
                let urls: Vec<String> = board.cards.iter().map(|c| c.image_url.clone()).collect();
                self.open_editor(board);
                self.request_pictures(urls)
            }
            Message::DuplicateBoard(id) => {
                let Some(copy) = self.boards.iter().find(|b| b.id == id).map(Board::duplicate) else {
                    return Task::none();
                };
                self.boards.insert(0, copy.clone());
                self.save_board(copy)
            }
            Message::DeleteBoard(id) => {
                self.boards.retain(|b| b.id != id);
                if self.stats_filter == BoardFilter::Board(id.clone()) {
                    self.stats_filter = BoardFilter::All;
                }
                if self.editor.as_ref().is_some_and(|e| e.board().id == id) {
                    self.close_editor();
                }
                let store = self.store.clone();
                let owner = self.owner();
                Task::perform(
                    async move {
                        store
                            .delete_board(&id, owner.as_deref())
                            .await
                            .map_err(|e| e.to_string())
                    },
                    Message::BoardDeleted,
                )
            }
            Message::BoardDeleted(result) => {
                self.note_result("Board deleted", result);
                Task::none()
            }
            Message::BoardSaved(result) => {
                self.note_result("Board saved", result);
                Task::none()
            }
            Message::ImportBoard => {
                let file = FileDialog::new()
                    .set_title("Import board")
                    .add_filter("Board file", &["json"])
                    .pick_file();
                let Some(path) = file else {
                    return Task::none();
                };
                Task::perform(import_from_file(path), Message::BoardImported)
            }
            Message::BoardImported(Ok(mut board)) => {
                board.user_id = self.owner();
                self.status = format!("📥 Imported '{}'", board.title);
                self.boards.insert(0, board.clone());
                self.save_board(board)
            }
            Message::ExportBoard => {
                let Some(board) = self.editor.as_ref().map(|e| e.board().clone()) else {
                    return Task::none();
                };
                let file = FileDialog::new()
                    .set_title("Export board")
                    .set_file_name(interchange::export_file_name(&board))
                    .add_filter("Board file", &["json"])
                    .save_file();
                let Some(path) = file else {
                    return Task::none();
                };
                self.status = format!("Exporting '{}'…", board.title);
                Task::perform(
                    export_to_file(board, path, self.http.clone()),
                    Message::BoardExported,
                )
            }
            Message::BoardExported(result) => {
                self.status = match result {
                    Ok(path) => format!("📤 Exported to {}", path.display()),
                    Err(e) => format!("❌ Export failed: {e}"),
                };
                Task::none()
            }

            // ---- navigation ----
            Message::ShowHome => {
                self.close_editor();
                self.screen = Screen::Home;
                Task::none()
            }
            Message::ShowEditor => {
                if self.editor.is_some() {
                    self.screen = Screen::Editor;
                }
                Task::none()
            }
            Message::ShowPrint => {
                if self.editor.is_some() {
                    self.card_form = None;
                    self.screen = Screen::Print;
                }
                Task::none()
            }
            Message::ShowAuth => {
                self.auth.error = None;
                self.screen = Screen::Auth;
                Task::none()
            }
            Message::ShowStats => {
                self.close_editor();
                self.screen = Screen::Stats;
                Task::none()
            }
            Message::StatsFilterSelected(filter) => {
                self.stats_filter = filter;
                Task::none()
            }
            Message::ShowFamily => {
                self.screen = Screen::Family;
                self.family.message = None;
                self.load_family()
            }

            // ---- board editor ----
            Message::Undo => {
                if self.transform.is_some() || self.screen != Screen::Editor {
                    return Task::none();
                }
                let changed = self.editor.as_mut().is_some_and(|e| e.undo());
                if changed {
                    self.persist_open_board()
                } else {
                    Task::none()
                }
            }
            Message::Redo => {
                if self.transform.is_some() || self.screen != Screen::Editor {
                    return Task::none();
                }
                let changed = self.editor.as_mut().is_some_and(|e| e.redo());
                if changed {
                    self.persist_open_board()
                } else {
                    Task::none()
                }
            }
            Message::SetGridMode(mode) => {
                self.grid_mode = mode;
                if mode.is_read_only() {
                    self.card_form = None;
                }
                Task::none()
            }
            Message::TitleChanged(title) => self.edit(|b| b.set_title(title)),
            Message::ColumnsSelected(columns) => self.edit(|b| b.set_columns(columns)),
            Message::GapChanged(gap) => self.edit(|b| b.set_gap(gap)),
            Message::BackgroundSelected(color) => self.edit(|b| b.set_background(color)),
            Message::ShareBoard(group) => self.edit(|b| b.family_group_id = group),
            Message::AddCard => {
                self.grid_mode = GridMode::Edit;
                self.copying_card = None;
                self.card_form = Some(CardForm::create());
                Task::none()
            }
            Message::EditCard(id) => {
                let card = self.editor.as_ref().and_then(|e| e.board().card(&id).cloned());
                if let Some(card) = card {
                    let url = card.image_url.clone();
                    self.copying_card = None;
                    self.card_form = Some(CardForm::edit(card));
                    return self.request_pictures(vec![url]);
                }
                Task::none()
            }
            Message::DuplicateCard(id) => self.edit(|b| {
                if let Some(index) = b.card_index(&id) {
                    let copy = b.cards[index].duplicate();
                    b.cards.insert(index + 1, copy);
                }
            }),
            Message::ChooseCopyTarget(id) => {
                self.card_form = None;
                self.copying_card = Some(id);
                Task::none()
            }
            Message::CancelCopyCard => {
                self.copying_card = None;
                Task::none()
            }
            Message::CopyCardTo(card_id, board_id) => {
                self.copying_card = None;
                let Some(card) = self.editor.as_ref().and_then(|e| e.board().card(&card_id).cloned()) else {
                    return Task::none();
                };
                if self.editor.as_ref().is_some_and(|e| e.board().id == board_id) {
                    return self.edit(|b| {
                        b.paste_card(&card);
                    });
                }
                let Some(target) = copy_card_into(&mut self.boards, &card, &board_id) else {
                    return Task::none();
                };
                log::info!("📋 Copied card '{}' to board {}", card.label, target.id);
                self.status = format!("📋 Copied '{}' to '{}'", card.label, target.title);
                self.save_board(target)
            }
            Message::RemoveCard(id) => {
                if self.card_form.as_ref().is_some_and(|f| f.card.id == id) {
                    self.card_form = None;
                }
                self.edit(|b| {
                    b.remove_card(&id);
                })
            }
            Message::MoveCard(from, to) => self.edit(|b| {
                b.move_card(from, to);
            }),
            Message::CardUsed(id) => self.edit(|b| {
                b.record_card_use(&id, now_millis());
            }),

            // ---- card form ----
            Message::CardLabelChanged(label) => {
                if let Some(form) = self.card_form.as_mut() {
                    form.card.label = label;
                }
                Task::none()
            }
            Message::CardImageUrlChanged(url) => {
                let Some(form) = self.card_form.as_mut() else {
                    return Task::none();
                };
                form.card.image_url = url.trim().to_string();
                let url = form.card.image_url.clone();
                self.request_pictures(vec![url])
            }
            Message::CardCategorySelected(category) => {
                if let Some(form) = self.card_form.as_mut() {
                    form.set_category(category);
                }
                Task::none()
            }
            Message::ChooseCardImage => {
                let file = FileDialog::new()
                    .set_title("Choose a picture")
                    .add_filter("Pictures", &["png", "jpg", "jpeg", "gif", "webp", "bmp"])
                    .pick_file();
                let (Some(path), Some(form)) = (file, self.card_form.as_mut()) else {
                    return Task::none();
                };
                form.uploading = true;
                let store = self.store.clone();
                let owner = self.owner();
                Task::perform(
                    async move {
                        let bytes = tokio::fs::read(&path).await.map_err(|e| e.to_string())?;
                        let name = path
                            .file_name()
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_default();
                        store
                            .upload_image(bytes, &name, owner.as_deref())
                            .await
                            .map_err(|e| e.to_string())
                    },
                    Message::CardImageUploaded,
                )
            }
            Message::CardImageUploaded(result) => {
                if let Some(form) = self.card_form.as_mut() {
                    form.uploading = false;
                }
                match result {
                    Ok(outcome) => {
                        self.note_outcome("Picture", &outcome);
                        let url = outcome.into_value();
                        if let Some(form) = self.card_form.as_mut() {
                            form.card.image_url = url.clone();
                        }
                        self.request_pictures(vec![url])
                    }
                    Err(e) => {
                        self.status = format!("❌ Could not read picture: {e}");
                        Task::none()
                    }
                }
            }
            Message::SaveCard => {
                let Some(form) = self.card_form.take() else {
                    return Task::none();
                };
                let CardForm { mut card, is_new, .. } = form;
                card.label = card.label.trim().to_string();
                if is_new {
                    self.edit(|b| b.add_card(card))
                } else {
                    self.edit(|b| {
                        b.replace_card(card);
                    })
                }
            }
            Message::CancelCard => {
                self.card_form = None;
                self.transform = None;
                Task::none()
            }
            Message::PictureLoaded(url, result) => {
                let picture = match result {
                    Ok(handle) => PictureState::Ready(handle),
                    Err(e) => {
                        log::warn!("⚠️  Picture unavailable: {e}");
                        PictureState::Failed(e)
                    }
                };
                self.pictures.insert(url, picture);
                Task::none()
            }

            // ---- picture editor ----
            Message::OpenTransform => {
                let Some(url) = self.card_form.as_ref().map(|f| f.card.image_url.clone()) else {
                    return Task::none();
                };
                self.transform = Some(TransformSession::new());
                self.transform_frame = None;
                let http = self.http.clone();
                Task::perform(
                    async move {
                        media::load_image(url, http)
                            .await
                            .map(Arc::new)
                            .map_err(|e| e.to_string())
                    },
                    Message::TransformSourceLoaded,
                )
            }
            Message::TransformSourceLoaded(result) => {
                if let Some(session) = self.transform.as_mut() {
                    match &result {
                        Ok(image) => session.source_loaded(Ok(image.as_ref())),
                        Err(e) => session.source_loaded(Err(e.clone())),
                    }
                }
                Task::none()
            }
            Message::ZoomChanged(scale) => self.adjust(|p| p.set_scale(scale)),
            Message::Zoom(delta) => self.adjust(|p| p.zoom_by(delta)),
            Message::BrightnessChanged(value) => self.adjust(|p| p.set_brightness(value)),
            Message::ContrastChanged(value) => self.adjust(|p| p.set_contrast(value)),
            Message::Rotate(degrees) => self.adjust(|p| p.rotate_by(degrees)),
            Message::ResetRotation => self.adjust(|p| p.reset_rotation()),
            Message::ResetTransform => self.adjust(|p| p.reset()),
            Message::PointerDown(x, y) => {
                if let Some(session) = self.transform.as_mut() {
                    session.pointer_down((x as f64, y as f64));
                }
                Task::none()
            }
            Message::PointerMoved(x, y) => {
                if let Some(session) = self.transform.as_mut() {
                    session.pointer_moved((x as f64, y as f64));
                }
                Task::none()
            }
            Message::PointerUp => {
                if let Some(session) = self.transform.as_mut() {
                    session.pointer_up();
                }
                Task::none()
            }
            Message::Frame => {
                if let Some(session) = self.transform.as_mut() {
                    if session.on_frame() {
                        self.transform_frame = session.frame().map(|frame| {
                            Handle::from_rgba(frame.width(), frame.height(), frame.as_raw().clone())
                        });
                    }
                }
                Task::none()
            }
            Message::ApplyTransform => {
                let Some(session) = self.transform.as_ref() else {
                    return Task::none();
                };
                match session.commit() {
                    Ok(url) => {
                        self.transform = None;
                        self.transform_frame = None;
                        if let Some(form) = self.card_form.as_mut() {
                            form.card.image_url = url.clone();
                        }
                        self.request_pictures(vec![url])
                    }
                    Err(e) => {
                        self.status = format!("❌ {e}");
                        Task::none()
                    }
                }
            }
            Message::CancelTransform => {
                self.transform = None;
                self.transform_frame = None;
                Task::none()
            }

            // ---- identity ----
            Message::AuthEmailChanged(email) => {
                self.auth.email = email;
                Task::none()
            }
            Message::AuthPasswordChanged(password) => {
                self.auth.password = password;
                Task::none()
            }
            Message::AuthNameChanged(name) => {
                self.auth.display_name = name;
                Task::none()
            }
            Message::ToggleAuthMode => {
                self.auth.signing_up = !self.auth.signing_up;
                self.auth.error = None;
                Task::none()
            }
            Message::SubmitAuth => {
                let Some(client) = self.remote.clone() else {
                    self.auth.error = Some(RemoteError::NotConfigured.to_string());
                    return Task::none();
                };
                if !self.auth.can_submit() {
                    return Task::none();
                }
                self.auth.busy = true;
                self.auth.error = None;
                let AuthForm {
                    email,
                    password,
                    display_name,
                    signing_up,
                    ..
                } = self.auth.clone();
                Task::perform(
                    async move {
                        let result = if signing_up {
                            client.sign_up(&email, &password, Some(display_name.as_str())).await
                        } else {
                            client.sign_in(&email, &password).await.map(Some)
                        };
                        result.map_err(|e| e.to_string())
                    },
                    Message::AuthFinished,
                )
            }
            Message::AuthFinished(Ok(Some(user))) => {
                self.status = format!("👋 Welcome, {}", user.name());
                self.user = Some(user);
                self.auth.reset();
                self.screen = Screen::Home;
                Task::batch([self.load_boards(), self.load_family()])
            }
            Message::AuthFinished(Ok(None)) => {
                self.auth.reset();
                self.auth.signing_up = false;
                self.auth.error = Some("Check your email to confirm the account, then sign in.".into());
                Task::none()
            }
            Message::AuthFinished(Err(e)) => {
                self.auth.busy = false;
                self.auth.error = Some(e);
                Task::none()
            }
            Message::SignOut => {
                self.user = None;
                self.family = FamilyState::default();
                self.close_editor();
                self.screen = Screen::Home;
                let Some(client) = self.remote.clone() else {
                    return self.load_boards();
                };
                Task::batch([
                    Task::perform(
                        async move { client.sign_out().await.map_err(|e| e.to_string()) },
                        Message::SignedOut,
                    ),
                    self.load_boards(),
                ])
            }
            Message::SignedOut(result) => {
                if let Err(e) = result {
                    log::warn!("⚠️  Sign-out request failed: {e}");
                }
                self.status = "Signed out".to_string();
                Task::none()
            }

            // ---- family groups ----
            Message::FamilyLoaded(result) => {
                self.family.loading = false;
                match result {
                    Ok(groups) => self.family.groups = groups,
                    Err(e) => self.family.message = Some(format!("❌ {e}")),
                }
                Task::none()
            }
            Message::GroupNameChanged(name) => {
                self.family.new_group_name = name;
                Task::none()
            }
            Message::CreateGroup => {
                let name = self.family.new_group_name.trim().to_string();
                let Some(owner) = self.owner().filter(|_| !name.is_empty()) else {
                    return Task::none();
                };
                self.family.new_group_name.clear();
                self.family_call(move |client| async move {
                    client.create_family_group(&name, &owner).await.map(|_| ())
                })
            }
            Message::JoinCodeChanged(code) => {
                self.family.join_code = remote::normalize_invite_code(&code);
                Task::none()
            }
            Message::MemberEmailChanged(email) => {
                self.family.member_email = email;
                Task::none()
            }
            Message::AddMember(group_id) => {
                let email = std::mem::take(&mut self.family.member_email);
                self.family_call(move |client| async move {
                    client
                        .add_family_member(&group_id, &email, MemberRole::Member)
                        .await
                })
            }
            Message::JoinGroup => {
                let Some(client) = self.remote.clone() else {
                    return Task::none();
                };
                let code = std::mem::take(&mut self.family.join_code);
                Task::perform(
                    async move { client.join_with_code(&code).await.map_err(|e| e.to_string()) },
                    Message::Joined,
                )
            }
            Message::Joined(Ok(result)) => {
                self.family.message = Some(match (result.success, &result.group_name, &result.message) {
                    (true, Some(name), _) => format!("✅ Joined {name}"),
                    (true, None, _) => "✅ Joined the group".to_string(),
                    (false, _, Some(message)) => format!("❌ {message}"),
                    (false, _, None) => "❌ That invite code did not work".to_string(),
                });
                if result.success {
                    return Task::batch([self.load_family(), self.load_boards()]);
                }
                Task::none()
            }
            Message::Joined(Err(e)) => {
                self.family.message = Some(format!("❌ {e}"));
                Task::none()
            }
            Message::GenerateInvite(group_id, group_name) => {
                let Some(client) = self.remote.clone() else {
                    return Task::none();
                };
                Task::perform(
                    async move {
                        client
                            .generate_invite_code(&group_id)
                            .await
                            .map(|code| (group_name, code))
                            .map_err(|e| e.to_string())
                    },
                    Message::InviteGenerated,
                )
            }
            Message::InviteGenerated(result) => {
                match result {
                    Ok(invite) => self.family.invite = Some(invite),
                    Err(e) => self.family.message = Some(format!("❌ {e}")),
                }
                Task::none()
            }
            Message::RemoveMember(member_id) => self.family_call(move |client| async move {
                client.remove_member(&member_id).await
            }),
            Message::SetMemberRole(member_id, role) => self.family_call(move |client| async move {
                client.update_member_role(&member_id, role).await
            }),
            Message::DeleteGroup(group_id) => self.family_call(move |client| async move {
                client.delete_family_group(&group_id).await
            }),
            Message::FamilyUpdated(result) => {
                if let Err(e) = result {
                    self.family.message = Some(format!("❌ {e}"));
                }
                self.load_family()
            }
        }
    }

    // ---- editor helpers ----

    fn open_editor(&mut self, board: Board) {
        self.editor = Some(BoardEditor::open(board));
        self.grid_mode = GridMode::Edit;
        self.card_form = None;
        self.copying_card = None;
        self.transform = None;
        self.screen = Screen::Editor;
    }

    fn close_editor(&mut self) {
        self.editor = None;
        self.card_form = None;
        self.copying_card = None;
        self.transform = None;
        self.transform_frame = None;
    }

    /// Apply a change to the open board, record it and save it
    fn edit<F>(&mut self, change: F) -> Task<Message>
    where
        F: FnOnce(&mut Board),
    {
        let Some(editor) = self.editor.as_mut() else {
            return Task::none();
        };
        if editor.apply(change).is_none() {
            return Task::none();
        }
        self.persist_open_board()
    }

    /// Save the open board as it is now shown, after an edit or undo/redo
    fn persist_open_board(&mut self) -> Task<Message> {
        let Some(board) = self.editor.as_ref().map(|e| e.board().clone()) else {
            return Task::none();
        };
        match self.boards.iter_mut().find(|b| b.id == board.id) {
            Some(listed) => *listed = board.clone(),
            None => self.boards.insert(0, board.clone()),
        }
        self.save_board(board)
    }

    // ---- background work ----

    fn load_boards(&self) -> Task<Message> {
        let store = self.store.clone();
        let owner = self.owner();
        Task::perform(
            async move {
                store
                    .list_boards(owner.as_deref())
                    .await
                    .map_err(|e| e.to_string())
            },
            Message::BoardsLoaded,
        )
    }

    fn save_board(&self, board: Board) -> Task<Message> {
        let store = self.store.clone();
        let owner = self.owner();
        Task::perform(
            async move {
                store
                    .save_board(&board, owner.as_deref())
                    .await
                    .map_err(|e| e.to_string())
            },
            Message::BoardSaved,
        )
    }

    /// Fetch any card pictures not loaded yet
    fn request_pictures(&mut self, urls: Vec<String>) -> Task<Message> {
        let mut tasks = Vec::new();
        for url in urls {
            if url.is_empty() || self.pictures.contains_key(&url) {
                continue;
            }
            self.pictures.insert(url.clone(), PictureState::Loading);
            let http = self.http.clone();
            tasks.push(Task::perform(
                async move {
                    let result = media::load_bytes(&url, &http)
                        .await
                        .map(Handle::from_bytes)
                        .map_err(|e| e.to_string());
                    (url, result)
                },
                |(url, result)| Message::PictureLoaded(url, result),
            ));
        }
        Task::batch(tasks)
    }

    /// Change the picture editor's parameters
    fn adjust<F>(&mut self, change: F) -> Task<Message>
    where
        F: FnOnce(&mut state::edit::TransformParams),
    {
        if let Some(session) = self.transform.as_mut() {
            session.update_params(change);
        }
        Task::none()
    }

    fn load_family(&mut self) -> Task<Message> {
        let (Some(client), Some(user)) = (self.remote.clone(), self.owner()) else {
            return Task::none();
        };
        self.family.loading = true;
        Task::perform(
            async move {
                client
                    .list_family_groups(&user)
                    .await
                    .map_err(|e| e.to_string())
            },
            Message::FamilyLoaded,
        )
    }

    /// Run a family mutation, then reload the groups
    fn family_call<F, Fut>(&self, call: F) -> Task<Message>
    where
        F: FnOnce(SupabaseClient) -> Fut,
        Fut: Future<Output = Result<(), RemoteError>> + Send + 'static,
    {
        let Some(client) = self.remote.clone() else {
            return Task::none();
        };
        let pending = call(client);
        Task::perform(
            async move { pending.await.map_err(|e| e.to_string()) },
            Message::FamilyUpdated,
        )
    }

    // ---- status ----

    fn note_outcome<T>(&mut self, what: &str, outcome: &SyncOutcome<T>) {
        self.status = match outcome {
            SyncOutcome::Synced(_) => format!("☁️  {what} synced"),
            SyncOutcome::LocalOnly(_) => format!("💾 {what} kept on this computer"),
            SyncOutcome::Fallback { reason, .. } => {
                format!("⚠️  {what} kept locally; backend unavailable: {reason}")
            }
        };
    }

    fn note_result<T>(&mut self, what: &str, result: Result<SyncOutcome<T>, String>) {
        match result {
            Ok(outcome) => self.note_outcome(what, &outcome),
            Err(e) => {
                log::error!("❌ {what}: {e}");
                self.status = format!("❌ {what} failed: {e}");
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let home = || {
            ui::home::view(
                &self.boards,
                &self.search,
                self.user.as_ref(),
                self.remote.is_some(),
            )
        };

        let content: Element<Message> = match (self.screen, &self.editor) {
            (Screen::Home, _) => home(),
            (Screen::Auth, _) => ui::auth::view(&self.auth),
            (Screen::Stats, _) => {
                let stats = UsageStats::compute(&self.boards, &self.stats_filter, now_millis());
                ui::stats::view(&stats, &self.stats_filter, &self.boards)
            }
            (Screen::Family, _) => match &self.user {
                Some(user) => ui::family::view(&self.family, user),
                None => ui::auth::view(&self.auth),
            },
            (Screen::Editor, Some(editor)) => match &self.transform {
                Some(session) => container(ui::image_editor::view(session, self.transform_frame.as_ref()))
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .center_x(Length::Fill)
                    .center_y(Length::Fill)
                    .into(),
                None => ui::editor::view(
                    editor,
                    self.grid_mode,
                    &self.pictures,
                    self.card_form.as_ref(),
                    self.copying_card.as_deref(),
                    &self.boards,
                    &self.family.groups,
                ),
            },
            (Screen::Print, Some(editor)) => ui::editor::print_view(editor, &self.pictures),
            (Screen::Editor | Screen::Print, None) => home(),
        };

        let status = container(text(&self.status).size(12))
            .padding([4, 16])
            .width(Length::Fill);

        column![container(content).height(Length::Fill), status].into()
    }

    fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![keyboard::on_key_press(shortcut)];
        if self
            .transform
            .as_ref()
            .is_some_and(TransformSession::needs_redraw)
        {
            subscriptions.push(iced::window::frames().map(|_| Message::Frame));
        }
        Subscription::batch(subscriptions)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Light
    }
}

/// Undo: Ctrl/Cmd+Z. Redo: Ctrl/Cmd+Shift+Z or Ctrl/Cmd+Y.
fn shortcut(key: Key, modifiers: Modifiers) -> Option<Message> {
    if !modifiers.command() {
        return None;
    }
    match key.as_ref() {
        Key::Character(c) if c.eq_ignore_ascii_case("z") && modifiers.shift() => Some(Message::Redo),
        Key::Character(c) if c.eq_ignore_ascii_case("z") => Some(Message::Undo),
        Key::Character(c) if c.eq_ignore_ascii_case("y") => Some(Message::Redo),
        _ => None,
    }
}

/// Paste `card` into the listed board `board_id`; returns the updated
/// board for saving
fn copy_card_into(boards: &mut [Board], card: &Card, board_id: &str) -> Option<Board> {
    let target = boards.iter_mut().find(|b| b.id == board_id)?;
    target.paste_card(card);
    Some(target.clone())
}

async fn import_from_file(path: PathBuf) -> Result<Board, String> {
    let json = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| format!("could not read {}: {e}", path.display()))?;
    interchange::import_board(&json, now_millis()).map_err(|e| e.to_string())
}

/// Write a self-contained board file: pictures are embedded first
async fn export_to_file(board: Board, path: PathBuf, http: reqwest::Client) -> Result<PathBuf, String> {
    let board = interchange::inline_images(board, http).await;
    let json = interchange::export_board(&board).map_err(|e| e.to_string())?;
    tokio::fs::write(&path, json)
        .await
        .map_err(|e| format!("could not write {}: {e}", path.display()))?;
    log::info!("📤 Exported board '{}' to {}", board.title, path.display());
    Ok(path)
}

fn main() -> iced::Result {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("pecs_board=info")).init();

    let config = AppConfig::from_env();

    iced::application("PECS Board", PecsBoard::update, PecsBoard::view)
        .theme(PecsBoard::theme)
        .subscription(PecsBoard::subscription)
        .centered()
        .run_with(move || PecsBoard::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcuts() {
        let z = Key::Character("z".into());
        assert!(matches!(shortcut(z.clone(), Modifiers::COMMAND), Some(Message::Undo)));
        assert!(matches!(
            shortcut(z.clone(), Modifiers::COMMAND | Modifiers::SHIFT),
            Some(Message::Redo)
        ));
        assert!(matches!(
            shortcut(Key::Character("y".into()), Modifiers::COMMAND),
            Some(Message::Redo)
        ));
        assert!(shortcut(z, Modifiers::empty()).is_none());
    }

    #[test]
    fn test_copy_card_into_other_board() {
        let mut source = Board::new("Food");
        source.add_card(Card::new("Apple", "https://example.com/apple.png"));
        let mut target = Board::new("Snacks");
        target.updated_at = 0;
        let mut boards = vec![source.clone(), target.clone()];

        let card = source.cards[0].clone();
        let saved = copy_card_into(&mut boards, &card, &target.id).unwrap();

        assert_eq!(saved.id, target.id);
        assert_eq!(saved.cards.len(), 1);
        assert_ne!(saved.cards[0].id, card.id);
        assert_eq!(saved.cards[0].label, "Apple");
        assert!(saved.updated_at > 0);
        assert_eq!(boards[0], source);
        assert_eq!(boards[1], saved);
        assert!(copy_card_into(&mut boards, &card, "missing").is_none());
    }

    #[tokio::test]
    async fn test_export_then_import_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");
        let mut board = Board::new("Trip");
        board.add_card(state::data::Card::new("Car", ""));

        export_to_file(board.clone(), path.clone(), reqwest::Client::new())
            .await
            .unwrap();
        let imported = import_from_file(path).await.unwrap();
        assert_eq!(imported.title, "Trip");
        assert_eq!(imported.cards.len(), 1);
        assert_ne!(imported.id, board.id);
    }
}
