use uuid::Uuid;

use crate::posts::models::PostFilter;

/// Joined post listing with community, author and comment count
const BASE_QUERY: &str = "SELECT p.id AS post_id, p.community_id, c.name AS community_name, \
p.author_id, u.username AS author_name, u.profile_image_url AS author_image_url, \
p.title, p.content, p.created_at, p.updated_at, COUNT(cm.id) AS comment_count \
FROM posts p \
JOIN communities c ON c.id = p.community_id \
JOIN users u ON u.id = p.author_id \
LEFT JOIN comments cm ON cm.post_id = p.id";

const GROUP_BY: &str = "GROUP BY p.id, c.name, u.username, u.profile_image_url";

/// Newest first; id breaks ties between posts created in the same instant
const ORDER_BY: &str = "ORDER BY p.created_at DESC, p.id DESC";

/// A bind value for a built query, kept typed so Postgres sees the right OID
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParam {
    Int(i32),
    Text(String),
    Uuid(Uuid),
}

/// Builds the parameterized post listing query from a `PostFilter`
#[derive(Debug, Default)]
pub struct PostQueryBuilder {
    where_clauses: Vec<String>,
    params: Vec<QueryParam>,
}

impl PostQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder with every filter in `filter` applied
    pub fn from_filter(filter: &PostFilter) -> Self {
        let mut builder = Self::new();
        if let Some(community_id) = filter.community_id {
            builder.add_community_filter(community_id);
        }
        if let Some(search) = filter.search.as_deref() {
            builder.add_search_filter(search);
        }
        if let Some(author_id) = filter.author_id {
            builder.add_author_filter(author_id);
        }
        builder
    }

    pub fn add_community_filter(&mut self, community_id: i32) {
        self.push_clause("p.community_id", QueryParam::Int(community_id));
    }

    /// Case-insensitive substring match on the title.
    /// A blank term adds no filter.
    pub fn add_search_filter(&mut self, search: &str) {
        let term = search.trim();
        if term.is_empty() {
            return;
        }
        let param_index = self.params.len() + 1;
        self.where_clauses
            .push(format!("p.title ILIKE ${}", param_index));
        self.params
            .push(QueryParam::Text(format!("%{}%", escape_like(term))));
    }

    pub fn add_author_filter(&mut self, author_id: Uuid) {
        self.push_clause("p.author_id", QueryParam::Uuid(author_id));
    }

    fn push_clause(&mut self, column: &str, param: QueryParam) {
        let param_index = self.params.len() + 1;
        self.where_clauses
            .push(format!("{} = ${}", column, param_index));
        self.params.push(param);
    }

    /// Returns the SQL text and its bind values in placeholder order
    pub fn build(&self) -> (String, Vec<QueryParam>) {
        let mut query = BASE_QUERY.to_string();

        if !self.where_clauses.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&self.where_clauses.join(" AND "));
        }

        query.push(' ');
        query.push_str(GROUP_BY);
        query.push(' ');
        query.push_str(ORDER_BY);

        (query, self.params.clone())
    }
}

/// Escape LIKE wildcards so user input only matches literally
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
