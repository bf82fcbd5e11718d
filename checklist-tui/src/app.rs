use checklist_core::{
    AuthFailure, Checklist, CredentialStore, Database, Error, LoginRequest, NewUser, Route,
    Session, Task, TaskId, TaskStore, User, UserId, ValidationError,
};
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;
use tracing::{error, info, warn};

pub struct Field {
    pub label: &'static str,
    pub value: String,
    pub secret: bool,
}

impl Field {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            secret: false,
        }
    }

    fn secret(label: &'static str) -> Self {
        Self {
            secret: true,
            ..Self::new(label)
        }
    }
}

/// Text fields followed by a link to the other form. `focus` equal to the
/// number of fields means the link is focused.
pub struct Form {
    pub title: &'static str,
    pub fields: Vec<Field>,
    pub focus: usize,
    pub submit: &'static str,
    pub link: &'static str,
}

impl Form {
    pub fn login() -> Self {
        Self {
            title: "user login",
            fields: vec![Field::new("username"), Field::secret("password")],
            focus: 0,
            submit: "login",
            link: "No account yet? Register",
        }
    }

    pub fn signup() -> Self {
        Self {
            title: "user registration",
            fields: vec![
                Field::new("name"),
                Field::new("date of birth"),
                Field::new("username"),
                Field::new("email"),
                Field::secret("password"),
            ],
            focus: 0,
            submit: "register",
            link: "Already have an account? Login",
        }
    }

    pub fn link_focused(&self) -> bool {
        self.focus == self.fields.len()
    }

    fn next(&mut self) {
        self.focus = (self.focus + 1) % (self.fields.len() + 1);
    }

    fn previous(&mut self) {
        self.focus = if self.focus == 0 {
            self.fields.len()
        } else {
            self.focus - 1
        };
    }

    fn input(&mut self) -> Option<&mut String> {
        self.fields.get_mut(self.focus).map(|f| &mut f.value)
    }

    fn value(&self, index: usize) -> String {
        self.fields
            .get(index)
            .map(|f| f.value.clone())
            .unwrap_or_default()
    }

    fn login_request(&self) -> LoginRequest {
        LoginRequest::new(self.value(0), self.value(1))
    }

    fn new_user(&self) -> NewUser {
        NewUser {
            name: self.value(0),
            date_of_birth: self.value(1),
            username: self.value(2),
            email: self.value(3),
            password: self.value(4),
        }
    }

    /// `submit` on Enter in a field, `link` on Enter over the link.
    fn handle_key(&mut self, key: KeyEvent, submit: Action, link: Route) -> Option<Action> {
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.next(),
            KeyCode::BackTab | KeyCode::Up => self.previous(),
            KeyCode::Enter if self.link_focused() => return Some(Action::Navigate(link)),
            KeyCode::Enter => return Some(submit),
            KeyCode::Backspace => {
                if let Some(input) = self.input() {
                    input.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(input) = self.input() {
                    input.push(c);
                }
            }
            _ => {}
        }
        None
    }
}

pub enum ChecklistMode {
    Normal,
    Adding(String),
    DeleteConfirm { task_id: TaskId, task_name: String },
}

pub struct ChecklistScreen {
    pub checklist: Checklist,
    pub task_state: ListState,
    pub mode: ChecklistMode,
}

impl ChecklistScreen {
    fn new(checklist: Checklist) -> Self {
        let mut screen = Self {
            checklist,
            task_state: ListState::default(),
            mode: ChecklistMode::Normal,
        };
        screen.clamp_selection();
        screen
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.task_state
            .selected()
            .and_then(|i| self.checklist.tasks().get(i))
    }

    fn is_capturing_text(&self) -> bool {
        self.checklist.edit_state().editing().is_some()
            || !matches!(self.mode, ChecklistMode::Normal)
    }

    pub fn next_task(&mut self) {
        let len = self.checklist.tasks().len();
        if len == 0 {
            return;
        }
        let i = match self.task_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.task_state.select(Some(i));
    }

    pub fn previous_task(&mut self) {
        let len = self.checklist.tasks().len();
        if len == 0 {
            return;
        }
        let i = match self.task_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.task_state.select(Some(i));
    }

    fn clamp_selection(&mut self) {
        let len = self.checklist.tasks().len();
        let selected = match self.task_state.selected() {
            _ if len == 0 => None,
            Some(i) if i >= len => Some(len - 1),
            Some(i) => Some(i),
            None => Some(0),
        };
        self.task_state.select(selected);
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if let Some(draft) = self.checklist.draft_mut() {
            match key.code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Tab => return Some(Action::FinishEdit),
                KeyCode::Backspace => {
                    draft.pop();
                }
                KeyCode::Char(c) => draft.push(c),
                _ => {}
            }
            return None;
        }

        match &mut self.mode {
            ChecklistMode::Adding(buffer) => match key.code {
                KeyCode::Enter => {
                    let task_name = std::mem::take(buffer);
                    self.mode = ChecklistMode::Normal;
                    return Some(Action::AddTask(task_name));
                }
                KeyCode::Esc => self.mode = ChecklistMode::Normal,
                KeyCode::Backspace => {
                    buffer.pop();
                }
                KeyCode::Char(c) => buffer.push(c),
                _ => {}
            },
            ChecklistMode::DeleteConfirm { task_id, .. } => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    let task_id = *task_id;
                    self.mode = ChecklistMode::Normal;
                    return Some(Action::DeleteTask(task_id));
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.mode = ChecklistMode::Normal;
                }
                _ => {}
            },
            ChecklistMode::Normal => match key.code {
                KeyCode::Down | KeyCode::Char('j') => self.next_task(),
                KeyCode::Up | KeyCode::Char('k') => self.previous_task(),
                KeyCode::Char('a') => self.mode = ChecklistMode::Adding(String::new()),
                KeyCode::Char(' ') | KeyCode::Char('c') => {
                    return self.selected_task().map(|t| Action::ToggleTask(t.id));
                }
                KeyCode::Enter | KeyCode::Char('e') | KeyCode::Char('r') => {
                    return self.selected_task().map(|t| Action::BeginEdit(t.id));
                }
                KeyCode::Char('D') | KeyCode::Delete => {
                    let selected = self
                        .selected_task()
                        .map(|t| (t.id, t.task_name.clone()));
                    if let Some((task_id, task_name)) = selected {
                        self.mode = ChecklistMode::DeleteConfirm { task_id, task_name };
                    }
                }
                KeyCode::Char('p') => {
                    return Some(Action::Navigate(Route::Profile {
                        user_id: self.checklist.user_id(),
                    }));
                }
                _ => {}
            },
        }
        None
    }

    async fn apply(&mut self, action: Action) -> checklist_core::Result<()> {
        match action {
            Action::AddTask(task_name) => {
                if self.checklist.add(&task_name).await?.is_some() {
                    let last = self.checklist.tasks().len().checked_sub(1);
                    self.task_state.select(last);
                }
            }
            Action::ToggleTask(task_id) => self.checklist.toggle(task_id).await?,
            Action::BeginEdit(task_id) => self.checklist.begin_edit(task_id).await?,
            Action::FinishEdit => self.checklist.finish_edit().await?,
            Action::DeleteTask(task_id) => self.checklist.remove(task_id).await?,
            _ => {}
        }
        self.clamp_selection();
        Ok(())
    }
}

pub enum Screen {
    Login(Form),
    Signup(Form),
    Profile { user_id: UserId, user: Option<User> },
    Checklist(ChecklistScreen),
}

impl Screen {
    pub fn route(&self) -> Route {
        match self {
            Screen::Login(_) => Route::Login,
            Screen::Signup(_) => Route::Signup,
            Screen::Profile { user_id, .. } => Route::Profile { user_id: *user_id },
            Screen::Checklist(screen) => Route::Checklist {
                user_id: screen.checklist.user_id(),
            },
        }
    }

    fn is_capturing_text(&self) -> bool {
        match self {
            Screen::Login(_) | Screen::Signup(_) => true,
            Screen::Profile { .. } => false,
            Screen::Checklist(screen) => screen.is_capturing_text(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: &'static str,
    pub message: String,
}

impl Alert {
    fn success(message: impl Into<String>) -> Self {
        Self {
            title: "success",
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            title: "error",
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.title == "error"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Checklist,
    Profile,
    Logout,
}

impl MenuItem {
    pub const ALL: [MenuItem; 3] = [MenuItem::Checklist, MenuItem::Profile, MenuItem::Logout];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Checklist => "checklist",
            MenuItem::Profile => "profile",
            MenuItem::Logout => "logout",
        }
    }
}

/// Work produced by a key press. Anything touching the database is an
/// action so the loop can redraw before awaiting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Login,
    Register,
    Navigate(Route),
    AddTask(String),
    ToggleTask(TaskId),
    BeginEdit(TaskId),
    FinishEdit,
    DeleteTask(TaskId),
    Logout,
    Quit,
}

impl Action {
    pub fn shows_loading(&self) -> bool {
        matches!(self, Action::Login | Action::Register)
    }
}

pub struct App {
    credentials: CredentialStore,
    tasks: TaskStore,
    session: Session,
    pub screen: Screen,
    pub alert: Option<Alert>,
    pub menu: Option<ListState>,
    pub show_help: bool,
    pub loading: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(db: &Database) -> Self {
        Self {
            credentials: db.credentials(),
            tasks: db.tasks(),
            session: Session::new(),
            screen: Screen::Login(Form::login()),
            alert: None,
            menu: None,
            show_help: false,
            loading: false,
            should_quit: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }

        if self.alert.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.alert = None;
            }
            return None;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return None;
        }

        if self.menu.is_some() {
            return self.handle_menu_key(key);
        }

        if !self.screen.is_capturing_text() {
            match key.code {
                KeyCode::Char('q') => return Some(Action::Quit),
                KeyCode::Char('?') => {
                    self.show_help = true;
                    return None;
                }
                KeyCode::Char('m') => {
                    let mut state = ListState::default();
                    state.select(Some(0));
                    self.menu = Some(state);
                    return None;
                }
                _ => {}
            }
        }

        match &mut self.screen {
            Screen::Login(form) => {
                if key.code == KeyCode::Esc {
                    return Some(Action::Quit);
                }
                form.handle_key(key, Action::Login, Route::Signup)
            }
            Screen::Signup(form) => {
                if key.code == KeyCode::Esc {
                    return Some(Action::Navigate(Route::Login));
                }
                form.handle_key(key, Action::Register, Route::Login)
            }
            Screen::Profile { user_id, .. } => match key.code {
                KeyCode::Enter | KeyCode::Char('b') | KeyCode::Esc => {
                    Some(Action::Navigate(Route::Checklist { user_id: *user_id }))
                }
                _ => None,
            },
            Screen::Checklist(screen) => screen.handle_key(key),
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) -> Option<Action> {
        let menu = self.menu.as_mut()?;
        let len = MenuItem::ALL.len();
        let selected = menu.selected().unwrap_or(0);
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => menu.select(Some((selected + 1) % len)),
            KeyCode::Up | KeyCode::Char('k') => menu.select(Some((selected + len - 1) % len)),
            KeyCode::Esc | KeyCode::Char('m') => self.menu = None,
            KeyCode::Enter => {
                self.menu = None;
                let user_id = self.screen.route().user_id()?;
                return Some(match MenuItem::ALL[selected % len] {
                    MenuItem::Checklist => Action::Navigate(Route::Checklist { user_id }),
                    MenuItem::Profile => Action::Navigate(Route::Profile { user_id }),
                    MenuItem::Logout => Action::Logout,
                });
            }
            _ => {}
        }
        None
    }

    /// Runs an action to completion. Store failures end up in an alert and
    /// leave the current screen as it was.
    pub async fn perform(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Login => self.login().await,
            Action::Register => self.register().await,
            Action::Navigate(route) => {
                self.navigate(route).await;
            }
            Action::Logout => self.logout(),
            Action::AddTask(_)
            | Action::ToggleTask(_)
            | Action::BeginEdit(_)
            | Action::FinishEdit
            | Action::DeleteTask(_) => {
                let Screen::Checklist(screen) = &mut self.screen else {
                    return;
                };
                let result = screen.apply(action).await;
                if let Err(err) = result {
                    self.fail("Could not update the checklist", err);
                }
            }
        }
    }

    async fn login(&mut self) {
        let Screen::Login(form) = &self.screen else {
            return;
        };
        let request = form.login_request();

        let result = self.session.login(&self.credentials, &request).await;
        match result {
            Ok(user) => {
                if self.navigate(Route::Checklist { user_id: user.id }).await {
                    self.alert = Some(Alert::success("Login successful"));
                } else {
                    self.session.logout();
                }
            }
            Err(err) => self.fail("Login failed", err),
        }
    }

    async fn register(&mut self) {
        let Screen::Signup(form) = &self.screen else {
            return;
        };
        let new_user = form.new_user();

        if let Err(err) = new_user.validate() {
            self.fail("Registration failed", err.into());
            return;
        }

        let result = self.credentials.register(&new_user).await;
        match result {
            Ok(_) => {
                self.screen = Screen::Login(Form::login());
                self.alert = Some(Alert::success("User registered successfully"));
            }
            Err(err) => self.fail("Registration failed", err),
        }
    }

    /// Returns whether the new screen is showing.
    async fn navigate(&mut self, route: Route) -> bool {
        if let Some(user_id) = route.user_id() {
            if self.session.current_user() != Some(user_id) {
                warn!(%user_id, "refusing route for a user without a session");
                self.alert = Some(Alert::error("Please log in first"));
                return false;
            }
        }

        match route {
            Route::Login => self.screen = Screen::Login(Form::login()),
            Route::Signup => self.screen = Screen::Signup(Form::signup()),
            Route::Checklist { user_id } => {
                match Checklist::load(self.tasks.clone(), user_id).await {
                    Ok(checklist) => {
                        self.screen = Screen::Checklist(ChecklistScreen::new(checklist));
                    }
                    Err(err) => {
                        self.fail("Could not load tasks", err);
                        return false;
                    }
                }
            }
            Route::Profile { user_id } => match self.credentials.find_by_id(user_id).await {
                Ok(user) => {
                    if user.is_none() {
                        self.alert = Some(Alert::error("User profile not found"));
                    }
                    self.screen = Screen::Profile { user_id, user };
                }
                Err(err) => {
                    self.fail("Could not load profile", err);
                    return false;
                }
            },
        }
        true
    }

    fn logout(&mut self) {
        if let Screen::Checklist(screen) = &mut self.screen {
            screen.checklist.discard_edit();
        }
        if let Some(user_id) = self.session.logout() {
            info!(%user_id, "user logged out");
        }
        self.menu = None;
        self.screen = Screen::Login(Form::login());
    }

    fn fail(&mut self, context: &'static str, err: Error) {
        match &err {
            Error::Validation(_)
            | Error::Authentication(_)
            | Error::DuplicateUsername(_)
            | Error::DuplicateEmail(_) => warn!(error = %err, "{context}"),
            _ => error!(error = %err, "{context}"),
        }
        self.alert = Some(Alert::error(user_message(&err, context)));
    }
}

fn user_message(err: &Error, fallback: &str) -> String {
    let message = match err {
        Error::Validation(ValidationError::MissingCredentials) => {
            "Please enter both username and password"
        }
        Error::Validation(ValidationError::MissingField(_)) => "All fields are required",
        Error::Authentication(AuthFailure::UnknownUsername) => "Username does not exist!",
        Error::Authentication(AuthFailure::WrongPassword) => "Incorrect password",
        Error::DuplicateUsername(_) => "Username already exists.",
        Error::DuplicateEmail(_) => "Email is already registered.",
        _ => fallback,
    };
    message.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, Database, App) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("checklist.db")).await.unwrap();
        let app = App::new(&db);
        (dir, db, app)
    }

    async fn press(app: &mut App, code: KeyCode) {
        if let Some(action) = app.handle_key(KeyEvent::new(code, KeyModifiers::NONE)) {
            app.perform(action).await;
        }
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c)).await;
        }
    }

    fn alert_message(app: &App) -> Option<&str> {
        app.alert.as_ref().map(|a| a.message.as_str())
    }

    async fn sign_up(app: &mut App, username: &str) {
        // login form: username, password, link
        press(app, KeyCode::BackTab).await;
        press(app, KeyCode::Enter).await;
        assert!(matches!(app.screen, Screen::Signup(_)));

        let email = format!("{username}@x.com");
        for value in ["Ann", "2000-01-01", username, email.as_str(), "pw"] {
            type_text(app, value).await;
            press(app, KeyCode::Tab).await;
        }
        press(app, KeyCode::BackTab).await;
        press(app, KeyCode::Enter).await;
    }

    async fn log_in(app: &mut App, username: &str, password: &str) {
        type_text(app, username).await;
        press(app, KeyCode::Tab).await;
        type_text(app, password).await;
        press(app, KeyCode::Enter).await;
    }

    fn checklist(app: &App) -> &ChecklistScreen {
        match &app.screen {
            Screen::Checklist(screen) => screen,
            _ => panic!("not on the checklist screen"),
        }
    }

    #[tokio::test]
    async fn signup_returns_to_login() {
        let (_dir, _db, mut app) = setup().await;

        sign_up(&mut app, "ann").await;

        assert_eq!(alert_message(&app), Some("User registered successfully"));
        assert!(matches!(app.screen, Screen::Login(_)));
    }

    #[tokio::test]
    async fn duplicate_signup_is_reported() {
        let (_dir, _db, mut app) = setup().await;
        sign_up(&mut app, "ann").await;
        press(&mut app, KeyCode::Enter).await;

        sign_up(&mut app, "ann").await;

        assert_eq!(alert_message(&app), Some("Username already exists."));
        assert!(matches!(app.screen, Screen::Signup(_)));
    }

    #[tokio::test]
    async fn incomplete_signup_never_reaches_the_store() {
        let (_dir, db, mut app) = setup().await;
        press(&mut app, KeyCode::BackTab).await;
        press(&mut app, KeyCode::Enter).await;
        type_text(&mut app, "Ann").await;
        press(&mut app, KeyCode::Enter).await;

        assert_eq!(alert_message(&app), Some("All fields are required"));
        assert!(db.credentials().find_by_id(UserId(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn login_failures_are_explained() {
        let (_dir, _db, mut app) = setup().await;
        sign_up(&mut app, "ann").await;
        press(&mut app, KeyCode::Enter).await;

        press(&mut app, KeyCode::Enter).await;
        assert_eq!(
            alert_message(&app),
            Some("Please enter both username and password")
        );
        press(&mut app, KeyCode::Enter).await;

        log_in(&mut app, "bob", "pw").await;
        assert_eq!(alert_message(&app), Some("Username does not exist!"));
        assert!(!app.session().is_authenticated());

        app.alert = None;
        app.screen = Screen::Login(Form::login());
        log_in(&mut app, "ann", "nope").await;
        assert_eq!(alert_message(&app), Some("Incorrect password"));
        assert!(!app.session().is_authenticated());
        assert!(matches!(app.screen, Screen::Login(_)));
    }

    #[tokio::test]
    async fn login_opens_the_users_checklist() {
        let (_dir, _db, mut app) = setup().await;
        sign_up(&mut app, "ann").await;
        press(&mut app, KeyCode::Enter).await;

        log_in(&mut app, "ann", "pw").await;

        assert_eq!(alert_message(&app), Some("Login successful"));
        let user_id = app.session().current_user().unwrap();
        assert_eq!(app.screen.route(), Route::Checklist { user_id });
    }

    #[tokio::test]
    async fn checklist_keys_drive_the_store() {
        let (_dir, db, mut app) = setup().await;
        sign_up(&mut app, "ann").await;
        press(&mut app, KeyCode::Enter).await;
        log_in(&mut app, "ann", "pw").await;
        press(&mut app, KeyCode::Enter).await;
        let user_id = app.session().current_user().unwrap();

        press(&mut app, KeyCode::Char('a')).await;
        type_text(&mut app, "Buy milk").await;
        press(&mut app, KeyCode::Enter).await;
        assert_eq!(checklist(&app).checklist.tasks().len(), 1);
        assert_eq!(checklist(&app).selected_task().unwrap().task_name, "Buy milk");

        press(&mut app, KeyCode::Char(' ')).await;
        assert!(checklist(&app).checklist.tasks()[0].completed);

        press(&mut app, KeyCode::Char('e')).await;
        for _ in 0.."milk".len() {
            press(&mut app, KeyCode::Backspace).await;
        }
        type_text(&mut app, "bread").await;
        press(&mut app, KeyCode::Enter).await;
        let stored = db.tasks().list(user_id).await.unwrap();
        assert_eq!(stored[0].task_name, "Buy bread");
        assert!(stored[0].completed);

        press(&mut app, KeyCode::Char('D')).await;
        press(&mut app, KeyCode::Char('y')).await;
        assert!(checklist(&app).checklist.tasks().is_empty());
        assert_eq!(checklist(&app).task_state.selected(), None);
    }

    #[tokio::test]
    async fn blank_edit_leaves_task_text_alone() {
        let (_dir, db, mut app) = setup().await;
        sign_up(&mut app, "ann").await;
        press(&mut app, KeyCode::Enter).await;
        log_in(&mut app, "ann", "pw").await;
        press(&mut app, KeyCode::Enter).await;
        let user_id = app.session().current_user().unwrap();
        db.tasks().add(user_id, "Walk dog").await.unwrap();
        app.perform(Action::Navigate(Route::Checklist { user_id })).await;

        press(&mut app, KeyCode::Char('e')).await;
        for _ in 0.."Walk dog".len() {
            press(&mut app, KeyCode::Backspace).await;
        }
        press(&mut app, KeyCode::Esc).await;

        assert_eq!(checklist(&app).checklist.tasks()[0].task_name, "Walk dog");
        assert_eq!(db.tasks().list(user_id).await.unwrap()[0].task_name, "Walk dog");
    }

    #[tokio::test]
    async fn menu_reaches_profile_and_logout() {
        let (_dir, _db, mut app) = setup().await;
        sign_up(&mut app, "ann").await;
        press(&mut app, KeyCode::Enter).await;
        log_in(&mut app, "ann", "pw").await;
        press(&mut app, KeyCode::Enter).await;

        press(&mut app, KeyCode::Char('m')).await;
        press(&mut app, KeyCode::Down).await;
        press(&mut app, KeyCode::Enter).await;
        match &app.screen {
            Screen::Profile { user: Some(user), .. } => assert_eq!(user.username, "ann"),
            _ => panic!("profile not shown"),
        }

        press(&mut app, KeyCode::Char('m')).await;
        press(&mut app, KeyCode::Up).await;
        press(&mut app, KeyCode::Enter).await;

        assert!(matches!(app.screen, Screen::Login(_)));
        assert!(!app.session().is_authenticated());
    }

    #[tokio::test]
    async fn logout_discards_a_pending_edit() {
        let (_dir, db, mut app) = setup().await;
        sign_up(&mut app, "ann").await;
        press(&mut app, KeyCode::Enter).await;
        log_in(&mut app, "ann", "pw").await;
        press(&mut app, KeyCode::Enter).await;
        let user_id = app.session().current_user().unwrap();

        press(&mut app, KeyCode::Char('a')).await;
        type_text(&mut app, "Buy milk").await;
        press(&mut app, KeyCode::Enter).await;
        press(&mut app, KeyCode::Char('e')).await;
        type_text(&mut app, " later").await;

        app.perform(Action::Logout).await;

        assert!(matches!(app.screen, Screen::Login(_)));
        assert_eq!(db.tasks().list(user_id).await.unwrap()[0].task_name, "Buy milk");
    }

    #[tokio::test]
    async fn routes_for_other_users_are_refused() {
        let (_dir, db, mut app) = setup().await;
        let other = db
            .credentials()
            .register(&NewUser {
                name: "Bob".into(),
                date_of_birth: "1999-09-09".into(),
                username: "bob".into(),
                email: "b@x.com".into(),
                password: "pw".into(),
            })
            .await
            .unwrap();

        app.perform(Action::Navigate(Route::Checklist { user_id: other }))
            .await;

        assert!(matches!(app.screen, Screen::Login(_)));
        assert!(app.alert.as_ref().is_some_and(Alert::is_error));
    }

    #[tokio::test]
    async fn store_failure_keeps_the_checklist_as_it_was() {
        let (_dir, db, mut app) = setup().await;
        sign_up(&mut app, "ann").await;
        press(&mut app, KeyCode::Enter).await;
        log_in(&mut app, "ann", "pw").await;
        press(&mut app, KeyCode::Enter).await;
        let user_id = app.session().current_user().unwrap();

        press(&mut app, KeyCode::Char('a')).await;
        type_text(&mut app, "Buy milk").await;
        press(&mut app, KeyCode::Enter).await;

        // The owning row is gone, so the insert trips the foreign key.
        assert!(db.credentials().delete(user_id).await.unwrap());
        press(&mut app, KeyCode::Char('a')).await;
        type_text(&mut app, "Walk dog").await;
        press(&mut app, KeyCode::Enter).await;

        let alert = app.alert.as_ref().unwrap();
        assert!(alert.is_error());
        assert_eq!(alert.message, "Could not update the checklist");
        assert_eq!(app.screen.route(), Route::Checklist { user_id });
        let names: Vec<_> = checklist(&app)
            .checklist
            .tasks()
            .iter()
            .map(|t| t.task_name.as_str())
            .collect();
        assert_eq!(names, ["Buy milk"]);
    }
}
