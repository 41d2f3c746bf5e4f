//! Typed upstream request bodies
//!
//! One struct per tool. Optional fields serialize only when present, so an
//! argument the caller left out never shows up as a key in the upstream body.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::ToolError;
use crate::registry::ToolSpec;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseRequest {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_comment_only: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRequest {
    pub app_no: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyBacklogRequest {
    pub url: String,
    pub content: String,
    pub should_assign: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets_image_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBacklogRequest {
    pub title: String,
    pub description: String,
    pub app_no: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets_image_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateJiraRequest {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyJiraRequest {
    pub url: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets_image_ids: Option<Vec<String>>,
}

/// `query` is the MCP argument name; upstream expects `text`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(rename(serialize = "text", deserialize = "query"))]
    pub query: String,
    pub app_no: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyInTeamsRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mention_no: Option<Number>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mention_no: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mention_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRequest {
    pub channel_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateThreadRequest {
    pub title: String,
    pub content: String,
    pub channel_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindThreadRequest {
    pub ticket_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_no: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListJiraRequest {
    pub url: String,
    pub app_no: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixCodeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_info: Option<String>,
}

/// Wire keys keep the upstream's spelling (`lessionLearn`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonLearnedRequest {
    pub context: String,
    pub bad: String,
    pub why: String,
    pub good: String,
    pub lession_learn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Upstream request of any registered tool
#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    Browse(BrowseRequest),
    ListBacklogHandlingTickets(AppRequest),
    ReplyBacklogTicket(ReplyBacklogRequest),
    CreateBacklogTicket(CreateBacklogRequest),
    CreateJiraTicket(CreateJiraRequest),
    ReplyJiraTicket(ReplyJiraRequest),
    Search(SearchRequest),
    ReadFirstUnreadNotification,
    ReadAllNotifications,
    ReplyInTeams(ReplyInTeamsRequest),
    ReadMentions,
    ReadMessageFromMention(MentionRequest),
    ReadThreads(ChannelRequest),
    CreateThread(CreateThreadRequest),
    FindThread(FindThreadRequest),
    ListJiraHandlingTickets(ListJiraRequest),
    GetScreenShot,
    FixCode(FixCodeRequest),
    RegisterLessonLearned(LessonLearnedRequest),
}

impl ToolRequest {
    /// Build the typed request from validated arguments
    pub fn from_args(spec: &ToolSpec, fields: Map<String, Value>) -> Result<Self, ToolError> {
        let args = Value::Object(fields);
        let parse_err = |e: serde_json::Error| ToolError::validation(spec.name, e.to_string());

        let request = match spec.name {
            "browse" => Self::Browse(serde_json::from_value(args).map_err(parse_err)?),
            "listBacklogHandlingTickets" => {
                Self::ListBacklogHandlingTickets(serde_json::from_value(args).map_err(parse_err)?)
            }
            "replyBacklogTicket" => {
                Self::ReplyBacklogTicket(serde_json::from_value(args).map_err(parse_err)?)
            }
            "createBacklogTicket" => {
                Self::CreateBacklogTicket(serde_json::from_value(args).map_err(parse_err)?)
            }
            "createJiraTicket" => {
                Self::CreateJiraTicket(serde_json::from_value(args).map_err(parse_err)?)
            }
            "replyJiraTicket" => {
                Self::ReplyJiraTicket(serde_json::from_value(args).map_err(parse_err)?)
            }
            "search" => Self::Search(serde_json::from_value(args).map_err(parse_err)?),
            "readFirstUnreadNotification" => Self::ReadFirstUnreadNotification,
            "readAllNotifications" => Self::ReadAllNotifications,
            "replyInTeams" => Self::ReplyInTeams(serde_json::from_value(args).map_err(parse_err)?),
            "readMentions" => Self::ReadMentions,
            "readMessageFromMention" => {
                Self::ReadMessageFromMention(serde_json::from_value(args).map_err(parse_err)?)
            }
            "readThreads" => Self::ReadThreads(serde_json::from_value(args).map_err(parse_err)?),
            "createThread" => Self::CreateThread(serde_json::from_value(args).map_err(parse_err)?),
            "findThread" => Self::FindThread(serde_json::from_value(args).map_err(parse_err)?),
            "listJiraHandlingTickets" => {
                Self::ListJiraHandlingTickets(serde_json::from_value(args).map_err(parse_err)?)
            }
            "getScreenShot" => Self::GetScreenShot,
            "fixCode" => Self::FixCode(serde_json::from_value(args).map_err(parse_err)?),
            "registerLessonLearned" => {
                Self::RegisterLessonLearned(serde_json::from_value(args).map_err(parse_err)?)
            }
            other => return Err(ToolError::UnknownTool(other.to_string())),
        };
        Ok(request)
    }

    /// JSON body sent upstream
    pub fn body(&self) -> Value {
        let body = match self {
            Self::Browse(r) => serde_json::to_value(r),
            Self::ListBacklogHandlingTickets(r) => serde_json::to_value(r),
            Self::ReplyBacklogTicket(r) => serde_json::to_value(r),
            Self::CreateBacklogTicket(r) => serde_json::to_value(r),
            Self::CreateJiraTicket(r) => serde_json::to_value(r),
            Self::ReplyJiraTicket(r) => serde_json::to_value(r),
            Self::Search(r) => serde_json::to_value(r),
            Self::ReplyInTeams(r) => serde_json::to_value(r),
            Self::ReadMessageFromMention(r) => serde_json::to_value(r),
            Self::ReadThreads(r) => serde_json::to_value(r),
            Self::CreateThread(r) => serde_json::to_value(r),
            Self::FindThread(r) => serde_json::to_value(r),
            Self::ListJiraHandlingTickets(r) => serde_json::to_value(r),
            Self::FixCode(r) => serde_json::to_value(r),
            Self::RegisterLessonLearned(r) => serde_json::to_value(r),
            Self::ReadFirstUnreadNotification
            | Self::ReadAllNotifications
            | Self::ReadMentions
            | Self::GetScreenShot => return Value::Object(Map::new()),
        };
        // Plain structs of strings, numbers and bools always serialize
        body.unwrap_or_else(|_| Value::Object(Map::new()))
    }
}
