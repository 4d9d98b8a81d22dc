use uuid::Uuid;

/// Who is looking at the site: an anonymous visitor or a known user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewer {
    #[default]
    Anonymous,
    User(Uuid),
}

impl Viewer {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Viewer::Anonymous => None,
            Viewer::User(id) => Some(*id),
        }
    }

    /// True when this viewer is the user with `user_id`.
    pub fn is(&self, user_id: Uuid) -> bool {
        self.user_id() == Some(user_id)
    }
}

impl From<Option<Uuid>> for Viewer {
    fn from(user_id: Option<Uuid>) -> Self {
        user_id.map_or(Viewer::Anonymous, Viewer::User)
    }
}
