use clap::ValueEnum;
use regex::Regex;

use super::{StoreError, StoreResult};

/// Fixed filename of the centralized user database.
pub const USERS_DB_FILE: &str = "admin_users.db";

/// SQL to create the `qbank` question table. Content only; user data lives in
/// the centralized user database.
pub const CREATE_QBANK_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS qbank (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        subject TEXT NOT NULL,
        chapter TEXT,
        topic TEXT NOT NULL,
        question TEXT NOT NULL,
        answer TEXT NOT NULL,
        is_premium INTEGER DEFAULT 1,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
";

/// SQL to create the `users` table, the sole source of account identity.
/// Email carries the uniqueness constraint the consolidation flow relies on.
pub const CREATE_USERS_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL,
        email TEXT UNIQUE NOT NULL,
        password TEXT NOT NULL,
        first_name TEXT,
        last_name TEXT,
        year_of_study TEXT DEFAULT '1st',
        college TEXT,
        user_type TEXT DEFAULT 'student',
        is_active INTEGER DEFAULT 1,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        last_login TIMESTAMP
    )
";

pub const CREATE_USER_BOOKMARKS_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS user_bookmarks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        question_id INTEGER NOT NULL,
        subject TEXT NOT NULL,
        topic TEXT NOT NULL,
        source_database TEXT NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (user_id) REFERENCES users (id),
        UNIQUE(user_id, question_id, source_database)
    )
";

pub const CREATE_USER_NOTES_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS user_notes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        question_id INTEGER NOT NULL,
        note TEXT NOT NULL,
        source_database TEXT NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (user_id) REFERENCES users (id)
    )
";

pub const CREATE_USER_TOPIC_COMPLETION_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS user_topic_completion (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        subject TEXT NOT NULL,
        topic TEXT NOT NULL,
        source_database TEXT NOT NULL,
        completed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (user_id) REFERENCES users (id),
        UNIQUE(user_id, subject, topic, source_database)
    )
";

pub const CREATE_USER_ANALYTICS_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS user_analytics (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        date DATE NOT NULL,
        questions_viewed INTEGER DEFAULT 0,
        answers_viewed INTEGER DEFAULT 0,
        topics_completed INTEGER DEFAULT 0,
        study_time_minutes INTEGER DEFAULT 0,
        databases_accessed TEXT,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (user_id) REFERENCES users (id),
        UNIQUE(user_id, date)
    )
";

pub const CREATE_MCQ_QUESTIONS_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS mcq_questions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        subject TEXT NOT NULL,
        chapter TEXT,
        topic TEXT NOT NULL,
        question TEXT NOT NULL,
        option_a TEXT NOT NULL,
        option_b TEXT NOT NULL,
        option_c TEXT NOT NULL,
        option_d TEXT NOT NULL,
        correct_answer TEXT NOT NULL,
        explanation TEXT,
        difficulty TEXT DEFAULT 'medium',
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
";

pub const CREATE_MCQ_TESTS_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS mcq_tests (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        test_name TEXT NOT NULL,
        subject TEXT NOT NULL,
        total_questions INTEGER NOT NULL,
        duration_minutes INTEGER NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
";

pub const CREATE_MCQ_RESULTS_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS mcq_results (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        test_id INTEGER NOT NULL,
        score INTEGER NOT NULL,
        total_questions INTEGER NOT NULL,
        percentage REAL NOT NULL,
        time_taken_minutes INTEGER NOT NULL,
        completed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
";

/// SQL to create the `admin_actions` audit table. Any database carrying a
/// table of this shape receives one audit row per mutation.
pub const CREATE_ADMIN_ACTIONS_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS admin_actions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        actor TEXT NOT NULL,
        action_type TEXT NOT NULL,
        target_db TEXT,
        target_table TEXT,
        details TEXT,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
";

pub const CREATE_SYSTEM_SETTINGS_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS system_settings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        setting_key TEXT UNIQUE NOT NULL,
        setting_value TEXT,
        description TEXT,
        updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
";

pub const CREATE_DATABASE_MIGRATIONS_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS database_migrations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        migration_name TEXT NOT NULL,
        source_database TEXT,
        target_database TEXT,
        records_migrated INTEGER DEFAULT 0,
        migration_date TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        status TEXT DEFAULT 'completed'
    )
";

pub const CREATE_TEST_INFO_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS test_info (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        test_name TEXT NOT NULL,
        description TEXT,
        duration_minutes INTEGER NOT NULL,
        start_time TIMESTAMP,
        end_time TIMESTAMP,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
";

pub const CREATE_TEST_QUESTIONS_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS test_questions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        test_id INTEGER NOT NULL,
        subject TEXT NOT NULL,
        topic TEXT NOT NULL,
        question TEXT NOT NULL,
        option_a TEXT NOT NULL,
        option_b TEXT NOT NULL,
        option_c TEXT NOT NULL,
        option_d TEXT NOT NULL,
        correct_answer TEXT NOT NULL,
        FOREIGN KEY (test_id) REFERENCES test_info (id)
    )
";

pub const CREATE_TEST_RESULTS_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS test_results (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        test_id INTEGER NOT NULL,
        user_id INTEGER,
        score INTEGER,
        taken_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (test_id) REFERENCES test_info (id)
    )
";

/// Classes of database files, defined by a filename pattern, the tables a
/// file must contain to qualify, and the DDL for a fresh file of that class.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, ValueEnum)]
pub enum Category {
    Qbank,
    Users,
    Mcq,
    Admin,
    Test,
}

pub const ALL_CATEGORIES: [Category; 5] = [
    Category::Qbank,
    Category::Users,
    Category::Mcq,
    Category::Admin,
    Category::Test,
];

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Qbank => "qbank",
            Self::Users => "users",
            Self::Mcq => "mcq",
            Self::Admin => "admin",
            Self::Test => "test",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Qbank => "Question Bank Databases",
            Self::Users => "Centralized User Database",
            Self::Mcq => "MCQ Databases",
            Self::Admin => "Admin & System Data",
            Self::Test => "Test Databases",
        }
    }

    /// Filename glob used by discovery. `*` matches any run of characters.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::Qbank => "*year*.db",
            Self::Users => "admin_users.db",
            Self::Mcq => "*mcq*.db",
            Self::Admin => "admin*.db",
            Self::Test => "*test*.db",
        }
    }

    /// Tables a file must contain to be accepted as this category on upload.
    pub fn required_tables(self) -> &'static [&'static str] {
        match self {
            Self::Qbank => &["qbank"],
            Self::Users => &["users"],
            Self::Mcq => &["mcq_questions"],
            Self::Admin => &["admin_actions"],
            Self::Test => &["test_info", "test_questions"],
        }
    }

    /// DDL bundle for a fresh database of this category, as
    /// (table name, create statement) pairs.
    pub fn schema(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Qbank => &[("qbank", CREATE_QBANK_TABLE_SQL)],
            Self::Users => &[
                ("users", CREATE_USERS_TABLE_SQL),
                ("user_bookmarks", CREATE_USER_BOOKMARKS_TABLE_SQL),
                ("user_notes", CREATE_USER_NOTES_TABLE_SQL),
                ("user_topic_completion", CREATE_USER_TOPIC_COMPLETION_TABLE_SQL),
                ("user_analytics", CREATE_USER_ANALYTICS_TABLE_SQL),
            ],
            Self::Mcq => &[
                ("mcq_questions", CREATE_MCQ_QUESTIONS_TABLE_SQL),
                ("mcq_tests", CREATE_MCQ_TESTS_TABLE_SQL),
                ("mcq_results", CREATE_MCQ_RESULTS_TABLE_SQL),
            ],
            Self::Admin => &[
                ("admin_actions", CREATE_ADMIN_ACTIONS_TABLE_SQL),
                ("system_settings", CREATE_SYSTEM_SETTINGS_TABLE_SQL),
                ("database_migrations", CREATE_DATABASE_MIGRATIONS_TABLE_SQL),
            ],
            Self::Test => &[
                ("test_info", CREATE_TEST_INFO_TABLE_SQL),
                ("test_questions", CREATE_TEST_QUESTIONS_TABLE_SQL),
                ("test_results", CREATE_TEST_RESULTS_TABLE_SQL),
            ],
        }
    }

    /// Filename a freshly created database of this category receives. The
    /// users category always maps to the fixed centralized filename; every
    /// other category derives a name its own discovery pattern will match.
    pub fn create_filename(self, base_name: &str) -> String {
        match self {
            Self::Qbank => format!("{base_name}_year.db"),
            Self::Users => USERS_DB_FILE.to_string(),
            Self::Mcq => format!("{base_name}_mcq.db"),
            Self::Admin => format!("admin_{base_name}.db"),
            Self::Test => format!("{base_name}_test.db"),
        }
    }

    pub fn pattern_regex(self) -> StoreResult<Regex> {
        compile_glob(self.pattern())
    }
}

/// Compiles a filename glob into an anchored regex. Only `*` and `?` are
/// treated as wildcards; everything else is matched literally.
fn compile_glob(pattern: &str) -> StoreResult<Regex> {
    let mut expr = String::from("^");
    for ch in pattern.chars() {
        match ch {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            _ => expr.push_str(&regex::escape(&ch.to_string())),
        }
    }
    expr.push('$');

    Regex::new(&expr)
        .map_err(|err| StoreError::Validation(format!("invalid filename pattern {pattern}: {err}")))
}
