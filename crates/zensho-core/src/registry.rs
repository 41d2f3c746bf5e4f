//! Static tool registry
//!
//! Every tool the adapter exposes is declared once in [`TOOLS`]. A declaration
//! carries the MCP-facing name and description, the upstream endpoint path, and
//! the input fields that double as the argument-validation contract.
//!
//! # Tool Categories
//!
//! ## Common
//! - `browse`, `search`, `registerLessonLearned`
//!
//! ## Backlog
//! - `listBacklogHandlingTickets`, `replyBacklogTicket`, `createBacklogTicket`
//! - `readFirstUnreadNotification`, `readAllNotifications`
//!
//! ## Jira
//! - `createJiraTicket`, `replyJiraTicket`, `listJiraHandlingTickets`
//!
//! ## Teams
//! - `replyInTeams`, `readMentions`, `readMessageFromMention`
//! - `readThreads`, `createThread`, `findThread`
//!
//! ## Manage
//! - `getScreenShot`, `fixCode`

use serde_json::{Map, Value, json};

/// Product area codes accepted by app-code fields, after upper-casing.
pub const APP_CODES: &[&str] = &["N", "KN", "SK", "ZET", "DMINI"];

/// Name of the optional argument that replaces the success text on tools
/// with [`ToolSpec::custom_message`] enabled.
pub const CUSTOM_MESSAGE_FIELD: &str = "customMessage";

/// Declared type of an input field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    StringArray,
    /// String restricted to the listed values (checked after normalization)
    Enum(&'static [&'static str]),
}

impl FieldKind {
    /// Human readable type name used in validation messages
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::String | FieldKind::Enum(_) => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::StringArray => "array of strings",
        }
    }
}

/// Normalization applied to a field after presence validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalize {
    None,
    Uppercase,
}

/// One declared input field of a tool
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub normalize: Normalize,
    pub description: &'static str,
}

/// Validation rule spanning several fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossFieldRule {
    /// At least one of the named optional fields must be present
    AtLeastOneOf(&'static [&'static str]),
}

/// Static definition of a tool
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// Upstream path, joined onto the configured base URL
    pub endpoint: &'static str,
    pub fields: &'static [FieldSpec],
    pub rule: Option<CrossFieldRule>,
    /// Accept a caller-supplied `customMessage` as the success text
    pub custom_message: bool,
}

impl ToolSpec {
    /// Look up a declared field by name
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether `key` is a known argument of this tool
    pub fn accepts(&self, key: &str) -> bool {
        self.field(key).is_some() || (self.custom_message && key == CUSTOM_MESSAGE_FIELD)
    }

    /// Render the MCP `inputSchema` for this tool
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in self.fields {
            properties.insert(field.name.to_string(), field_schema(field));
            if field.required {
                required.push(Value::String(field.name.to_string()));
            }
        }

        if self.custom_message {
            properties.insert(
                CUSTOM_MESSAGE_FIELD.to_string(),
                json!({
                    "type": "string",
                    "description": "Text to return instead of the upstream response on success"
                }),
            );
        }

        let mut schema = json!({
            "type": "object",
            "properties": properties,
        });
        if !required.is_empty() {
            schema["required"] = Value::Array(required);
        }
        if let Some(CrossFieldRule::AtLeastOneOf(names)) = self.rule {
            schema["anyOf"] = Value::Array(
                names
                    .iter()
                    .map(|n| json!({ "required": [n] }))
                    .collect(),
            );
        }
        schema
    }
}

fn field_schema(field: &FieldSpec) -> Value {
    let mut schema = match field.kind {
        FieldKind::String => json!({ "type": "string" }),
        FieldKind::Number => json!({ "type": "number" }),
        FieldKind::Boolean => json!({ "type": "boolean" }),
        FieldKind::StringArray => json!({ "type": "array", "items": { "type": "string" } }),
        // Lowercase input is accepted, so the enum is documented rather than enforced here
        FieldKind::Enum(values) => json!({
            "type": "string",
            "description": format!("Allowed values: {} (case-insensitive)", values.join(", ")),
        }),
    };

    let description = match schema.get("description").and_then(Value::as_str) {
        Some(allowed) => format!("{} {}", field.description, allowed),
        None => field.description.to_string(),
    };
    schema["description"] = Value::String(description);
    schema
}

/// Look up a tool definition by name
pub fn lookup(name: &str) -> Option<&'static ToolSpec> {
    TOOLS.iter().find(|t| t.name == name)
}

/// All registered tool definitions, in catalog order
pub fn all() -> &'static [ToolSpec] {
    TOOLS
}

const fn required(name: &'static str, kind: FieldKind, description: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required: true,
        normalize: Normalize::None,
        description,
    }
}

const fn optional(name: &'static str, kind: FieldKind, description: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required: false,
        normalize: Normalize::None,
        description,
    }
}

const fn app_code(name: &'static str, required: bool, description: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Enum(APP_CODES),
        required,
        normalize: Normalize::Uppercase,
        description,
    }
}

const ASSETS_IMAGE_IDS: FieldSpec = FieldSpec {
    name: "assetsImageIds",
    kind: FieldKind::StringArray,
    required: false,
    normalize: Normalize::None,
    description: "IDs of previously uploaded screenshots to attach",
};

static TOOLS: &[ToolSpec] = &[
    // Common
    ToolSpec {
        name: "browse",
        description: r#"Browse and fetch content from a URL. Supports Jira issues, Backlog URLs/keys, and Teams messages.

Response format (200):
{
  "content": "Main extracted content",
  "reference_links": "Extracted reference links within content",
  "comments": "Comments from related users",
  "parentContent": "Parent content (for Teams thread starter)"
}"#,
        endpoint: "/api/common/browse",
        fields: &[
            required(
                "url",
                FieldKind::String,
                "The URL or key to browse: Jira issue URL/key, Backlog URL/key or Teams message URL",
            ),
            optional(
                "oneCommentOnly",
                FieldKind::Boolean,
                "Fetch less data when the full response is too large",
            ),
        ],
        rule: None,
        custom_message: false,
    },
    // Backlog
    ToolSpec {
        name: "listBacklogHandlingTickets",
        description: r#"List all Backlog tickets currently being handled for an app.

Response format (200):
{
  "tickets": [{ "key": "DEV_N_APP-2993", "title": "Ticket title" }],
  "num": 10
}"#,
        endpoint: "/api/backlog/listHandlingTickets",
        fields: &[app_code("appNo", true, "The app to list handling tickets for.")],
        rule: None,
        custom_message: false,
    },
    ToolSpec {
        name: "replyBacklogTicket",
        description: r#"Reply to an existing Backlog ticket with a comment.

Response format (200):
{
  "message": "Comment posted successfully",
  "commentUrl": "URL of the comment after posting",
  "imageUrl": "Screenshot of the screen after commenting"
}"#,
        endpoint: "/api/backlog/replyIssue",
        fields: &[
            required("url", FieldKind::String, "The Backlog ticket URL or key (e.g. DEV_005_SPO-7012)"),
            required("content", FieldKind::String, "The content of the comment to post"),
            required(
                "shouldAssign",
                FieldKind::Boolean,
                "Whether to assign the ticket back to its reporter",
            ),
            ASSETS_IMAGE_IDS,
        ],
        rule: None,
        custom_message: false,
    },
    ToolSpec {
        name: "createBacklogTicket",
        description: r#"Create a new Backlog ticket for an app.

Response format (200):
{
  "issueKey": "DEV_N_APP-2967",
  "message": "Additional status message (optional)"
}"#,
        endpoint: "/api/backlog/createIssue",
        fields: &[
            required("title", FieldKind::String, "The title of the Backlog issue"),
            required("description", FieldKind::String, "The detailed description of the issue"),
            app_code("appNo", true, "The app the issue belongs to."),
            ASSETS_IMAGE_IDS,
        ],
        rule: None,
        custom_message: false,
    },
    // Jira
    ToolSpec {
        name: "createJiraTicket",
        description: r#"Create a new Jira ticket.

Response format (200):
{
  "message": "Success message",
  "issueUrl": "https://pm.gem-corp.tech/browse/ZEN2025-XXXX"
}"#,
        endpoint: "/api/jira/createIssue",
        fields: &[
            required("title", FieldKind::String, "The title of the Jira issue"),
            required("description", FieldKind::String, "The detailed description of the issue"),
            app_code("type", true, "The app type of the Jira issue."),
        ],
        rule: None,
        custom_message: false,
    },
    ToolSpec {
        name: "replyJiraTicket",
        description: r#"Reply to an existing Jira ticket with a comment.

Response format (200):
{
  "message": "Comment posted successfully",
  "commentUrl": "URL of the comment after posting"
}"#,
        endpoint: "/api/jira/replyIssue",
        fields: &[
            required(
                "url",
                FieldKind::String,
                "The Jira ticket URL or key (e.g. ZEN2025-1197)",
            ),
            required("content", FieldKind::String, "The content of the comment to post"),
            ASSETS_IMAGE_IDS,
        ],
        rule: None,
        custom_message: false,
    },
    ToolSpec {
        name: "search",
        description: r#"Search documents and issues of an app using a text query.

Response format (200):
[
  { "id": "DEV_ZET_APP-266", "title": "Document or issue title", "url": "https://..." }
]"#,
        endpoint: "/api/data/search",
        fields: &[
            required(
                "query",
                FieldKind::String,
                "The search query (e.g. version number, keywords)",
            ),
            app_code("appNo", true, "The app to search in."),
        ],
        rule: None,
        custom_message: false,
    },
    ToolSpec {
        name: "readFirstUnreadNotification",
        description: r#"Open the first unread Backlog notification and return its content.

Response format (200):
{
  "content": "Notification content",
  "url": "URL of the related ticket"
}"#,
        endpoint: "/api/backlog/readFirstUnreadNotification",
        fields: &[],
        rule: None,
        custom_message: false,
    },
    ToolSpec {
        name: "readAllNotifications",
        description: r#"Mark every Backlog notification as read.

Response format (200):
{
  "message": "All notifications marked as read"
}"#,
        endpoint: "/api/backlog/readAllNotifications",
        fields: &[],
        rule: None,
        custom_message: true,
    },
    // Teams
    ToolSpec {
        name: "replyInTeams",
        description: r#"Reply in a Teams conversation, addressed either by message URL or by mention number from readMentions. At least one of url or mentionNo is required.

Response format (200):
{
  "message": "Reply posted successfully"
}"#,
        endpoint: "/api/teams/replyInTeams",
        fields: &[
            required("text", FieldKind::String, "The reply text"),
            optional("url", FieldKind::String, "The Teams message URL to reply to"),
            optional(
                "mentionNo",
                FieldKind::Number,
                "The mention number returned by readMentions",
            ),
        ],
        rule: Some(CrossFieldRule::AtLeastOneOf(&["url", "mentionNo"])),
        custom_message: false,
    },
    ToolSpec {
        name: "readMentions",
        description: r#"List recent Teams messages that mention the current user.

Response format (200):
{
  "mentions": [{ "mentionNo": 1, "mentionId": "...", "from": "...", "preview": "..." }]
}"#,
        endpoint: "/api/teams/readMentions",
        fields: &[],
        rule: None,
        custom_message: false,
    },
    ToolSpec {
        name: "readMessageFromMention",
        description: r#"Read the full Teams message behind a mention. At least one of mentionNo or mentionId is required.

Response format (200):
{
  "content": "Message content",
  "url": "Teams message URL"
}"#,
        endpoint: "/api/teams/readMessageFromMention",
        fields: &[
            optional(
                "mentionNo",
                FieldKind::Number,
                "The mention number returned by readMentions",
            ),
            optional(
                "mentionId",
                FieldKind::String,
                "The mention ID returned by readMentions",
            ),
        ],
        rule: Some(CrossFieldRule::AtLeastOneOf(&["mentionNo", "mentionId"])),
        custom_message: false,
    },
    ToolSpec {
        name: "readThreads",
        description: r#"Read the latest threads of a Teams channel.

Response format (200):
{
  "threads": [{ "title": "...", "url": "...", "replies": 3 }]
}"#,
        endpoint: "/api/teams/readThreads",
        fields: &[required("channelName", FieldKind::String, "The Teams channel name")],
        rule: None,
        custom_message: false,
    },
    ToolSpec {
        name: "createThread",
        description: r#"Start a new thread in a Teams channel.

Response format (200):
{
  "message": "Thread created",
  "url": "URL of the new thread"
}"#,
        endpoint: "/api/teams/createThread",
        fields: &[
            required("title", FieldKind::String, "The thread title"),
            required("content", FieldKind::String, "The thread body"),
            required("channelName", FieldKind::String, "The Teams channel name"),
        ],
        rule: None,
        custom_message: false,
    },
    ToolSpec {
        name: "findThread",
        description: r#"Find the Teams thread that discusses a ticket.

Response format (200):
{
  "url": "URL of the thread",
  "title": "Thread title"
}"#,
        endpoint: "/api/teams/findThread",
        fields: &[
            required("ticketKey", FieldKind::String, "The ticket key (e.g. DEV_N_APP-2993)"),
            app_code("appNo", false, "Restrict the search to one app."),
        ],
        rule: None,
        custom_message: false,
    },
    ToolSpec {
        name: "listJiraHandlingTickets",
        description: r#"List the Jira tickets currently being handled for an app.

Response format (200):
{
  "tickets": [{ "key": "ZEN2025-2651", "title": "Ticket title" }],
  "num": 3
}"#,
        endpoint: "/api/jira/listHandlingTickets",
        fields: &[
            required("url", FieldKind::String, "The Jira filter or board URL"),
            app_code("appNo", true, "The app to list handling tickets for."),
        ],
        rule: None,
        custom_message: false,
    },
    // Manage
    ToolSpec {
        name: "getScreenShot",
        description: r#"Take a screenshot of the page currently opened by the automation browser.

Response format (200):
{
  "message": "Screenshot taken",
  "imageUrl": "https://res.cloudinary.com/.../screenshot.png"
}"#,
        endpoint: "/manage/getScreenShot",
        fields: &[],
        rule: None,
        custom_message: false,
    },
    ToolSpec {
        name: "fixCode",
        description: r#"Ask the automation service to apply a code fix.

Response format (200):
{
  "message": "Fix applied"
}"#,
        endpoint: "/manage/fixCode",
        fields: &[
            optional("apiName", FieldKind::String, "The API the fix applies to"),
            optional("extraInfo", FieldKind::String, "Additional context for the fix"),
        ],
        rule: None,
        custom_message: false,
    },
    ToolSpec {
        name: "registerLessonLearned",
        description: r#"Record a lesson learned from a handled ticket.

Response format (200):
{
  "message": "Lesson registered"
}"#,
        endpoint: "/api/common/lessionLearn",
        fields: &[
            required("context", FieldKind::String, "What was being done"),
            required("bad", FieldKind::String, "What went wrong"),
            required("why", FieldKind::String, "Why it went wrong"),
            required("good", FieldKind::String, "What should have been done"),
            required("lessionLearn", FieldKind::String, "The lesson to keep"),
            optional("scope", FieldKind::String, "Where the lesson applies"),
        ],
        rule: None,
        custom_message: true,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_has_every_tool() {
        assert_eq!(all().len(), 19);
        for name in [
            "browse",
            "listBacklogHandlingTickets",
            "replyBacklogTicket",
            "createBacklogTicket",
            "createJiraTicket",
            "replyJiraTicket",
            "search",
            "readFirstUnreadNotification",
            "readAllNotifications",
            "replyInTeams",
            "readMentions",
            "readMessageFromMention",
            "readThreads",
            "createThread",
            "findThread",
            "listJiraHandlingTickets",
            "getScreenShot",
            "fixCode",
            "registerLessonLearned",
        ] {
            assert!(lookup(name).is_some(), "missing tool {}", name);
        }
    }

    #[test]
    fn names_are_unique() {
        let names: HashSet<&str> = all().iter().map(|t| t.name).collect();
        assert_eq!(names.len(), all().len());
    }

    #[test]
    fn lookup_unknown_returns_none() {
        assert!(lookup("deleteEverything").is_none());
        assert!(lookup("Browse").is_none());
    }

    #[test]
    fn endpoints_are_absolute_paths() {
        for tool in all() {
            assert!(tool.endpoint.starts_with('/'), "{}", tool.name);
        }
        assert_eq!(lookup("search").unwrap().endpoint, "/api/data/search");
        assert_eq!(
            lookup("registerLessonLearned").unwrap().endpoint,
            "/api/common/lessionLearn"
        );
    }

    #[test]
    fn input_schema_lists_required_fields() {
        let schema = lookup("createBacklogTicket").unwrap().input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(
            schema["required"],
            json!(["title", "description", "appNo"])
        );
        assert_eq!(schema["properties"]["assetsImageIds"]["type"], "array");
        assert_eq!(
            schema["properties"]["assetsImageIds"]["items"]["type"],
            "string"
        );
    }

    #[test]
    fn input_schema_documents_app_codes() {
        let schema = lookup("search").unwrap().input_schema();
        let description = schema["properties"]["appNo"]["description"].as_str().unwrap();
        assert!(description.contains("N, KN, SK, ZET, DMINI"));
    }

    #[test]
    fn input_schema_without_fields_has_no_required_key() {
        let schema = lookup("getScreenShot").unwrap().input_schema();
        assert!(schema.get("required").is_none());
        assert_eq!(schema["properties"], json!({}));
    }

    #[test]
    fn input_schema_expresses_alternative_identifiers() {
        let schema = lookup("replyInTeams").unwrap().input_schema();
        assert_eq!(
            schema["anyOf"],
            json!([{ "required": ["url"] }, { "required": ["mentionNo"] }])
        );
        assert_eq!(schema["required"], json!(["text"]));
    }

    #[test]
    fn custom_message_is_declared_only_where_enabled() {
        let lesson = lookup("registerLessonLearned").unwrap();
        assert!(lesson.accepts(CUSTOM_MESSAGE_FIELD));
        assert!(lesson.input_schema()["properties"]
            .get(CUSTOM_MESSAGE_FIELD)
            .is_some());

        let browse = lookup("browse").unwrap();
        assert!(!browse.accepts(CUSTOM_MESSAGE_FIELD));
    }
}
