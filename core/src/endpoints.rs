//! Declarative table of helpdesk backend endpoints.
//!
//! # Design
//! Each entry names the endpoint, its method and path template, its query
//! parameters and how its body is sent. The `endpoints!` generator turns
//! every entry into:
//!
//! - a pure builder `endpoints::<name>(..)` returning the `RequestDescriptor`
//!   (wrapped in `Result` when a structured body has to be serialized);
//! - a `HelpdeskClient::<name>(..)` wrapper that builds the descriptor and
//!   forwards it to `HelpdeskClient::request`;
//! - a row of the static `ENDPOINTS` table.
//!
//! Body formats: no marker means no body; `with form` takes any `Serialize`
//! value and leaves the content type undeclared, so the default policy
//! form-encodes it; `with json` declares JSON; `with multipart` takes a
//! `MultipartForm`.

use std::fmt::Display;

use serde::Serialize;

use crate::client::HelpdeskClient;
use crate::error::ApiError;
use crate::http::{ApiResponse, HttpMethod, QueryValue, RequestDescriptor};
use crate::multipart::MultipartForm;

/// How an endpoint sends its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Empty,
    Form,
    Json,
    Multipart,
}

/// One row of the endpoint table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub name: &'static str,
    pub method: HttpMethod,
    pub path: &'static str,
    pub query: &'static [&'static str],
    pub format: BodyFormat,
}

impl Endpoint {
    pub fn find(name: &str) -> Option<&'static Endpoint> {
        ENDPOINTS.iter().find(|endpoint| endpoint.name == name)
    }

    /// Names of the `{param}` placeholders in the path template.
    pub fn path_params(&self) -> Vec<&'static str> {
        let path: &'static str = self.path;
        path.split('/')
            .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
            .collect()
    }
}

/// Substitute `{name}` placeholders with percent-encoded values.
pub fn expand_path(template: &str, params: &[(&str, String)]) -> String {
    let mut path = template.to_string();
    for (name, value) in params {
        path = path.replace(&format!("{{{name}}}"), &urlencoding::encode(value));
    }
    path
}

fn structured(body: &impl Serialize) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Encoding(e.to_string()))
}

macro_rules! endpoints {
    (@method GET) => { HttpMethod::Get };
    (@method POST) => { HttpMethod::Post };
    (@method PUT) => { HttpMethod::Put };
    (@method DELETE) => { HttpMethod::Delete };

    (@format) => { BodyFormat::Empty };
    (@format form) => { BodyFormat::Form };
    (@format json) => { BodyFormat::Json };
    (@format multipart) => { BodyFormat::Multipart };

    (@descriptor $method:ident $path:literal ($($arg:ident),*) [$($key:literal = $q:ident),*]) => {
        RequestDescriptor::new(
            endpoints!(@method $method),
            expand_path($path, &[$((stringify!($arg), $arg.to_string())),*]),
        )
        $(.query($key, $q))*
    };

    (@builder [$($attr:tt)*] $name:ident ($($arg:ident),*) [$($key:literal = $q:ident),*] $method:ident $path:literal []) => {
        $($attr)*
        pub fn $name($($arg: impl Display,)* $($q: impl Into<QueryValue>,)*) -> RequestDescriptor {
            endpoints!(@descriptor $method $path ($($arg),*) [$($key = $q),*])
        }
    };
    (@builder [$($attr:tt)*] $name:ident ($($arg:ident),*) [$($key:literal = $q:ident),*] $method:ident $path:literal [form]) => {
        $($attr)*
        pub fn $name($($arg: impl Display,)* $($q: impl Into<QueryValue>,)* body: &impl Serialize) -> Result<RequestDescriptor, ApiError> {
            let body = structured(body)?;
            Ok(endpoints!(@descriptor $method $path ($($arg),*) [$($key = $q),*]).value(body))
        }
    };
    (@builder [$($attr:tt)*] $name:ident ($($arg:ident),*) [$($key:literal = $q:ident),*] $method:ident $path:literal [json]) => {
        $($attr)*
        pub fn $name($($arg: impl Display,)* $($q: impl Into<QueryValue>,)* body: &impl Serialize) -> Result<RequestDescriptor, ApiError> {
            let body = structured(body)?;
            Ok(endpoints!(@descriptor $method $path ($($arg),*) [$($key = $q),*]).json(body))
        }
    };
    (@builder [$($attr:tt)*] $name:ident ($($arg:ident),*) [$($key:literal = $q:ident),*] $method:ident $path:literal [multipart]) => {
        $($attr)*
        pub fn $name($($arg: impl Display,)* $($q: impl Into<QueryValue>,)* form: MultipartForm) -> RequestDescriptor {
            endpoints!(@descriptor $method $path ($($arg),*) [$($key = $q),*]).multipart(form)
        }
    };

    (@wrapper [$($attr:tt)*] $name:ident ($($arg:ident),*) [$($q:ident),*] []) => {
        $($attr)*
        pub fn $name(&self, $($arg: impl Display,)* $($q: impl Into<QueryValue>,)*) -> Result<ApiResponse, ApiError> {
            self.request(self::$name($($arg,)* $($q,)*))
        }
    };
    (@wrapper [$($attr:tt)*] $name:ident ($($arg:ident),*) [$($q:ident),*] [form]) => {
        $($attr)*
        pub fn $name(&self, $($arg: impl Display,)* $($q: impl Into<QueryValue>,)* body: &impl Serialize) -> Result<ApiResponse, ApiError> {
            self.request(self::$name($($arg,)* $($q,)* body)?)
        }
    };
    (@wrapper [$($attr:tt)*] $name:ident ($($arg:ident),*) [$($q:ident),*] [json]) => {
        $($attr)*
        pub fn $name(&self, $($arg: impl Display,)* $($q: impl Into<QueryValue>,)* body: &impl Serialize) -> Result<ApiResponse, ApiError> {
            self.request(self::$name($($arg,)* $($q,)* body)?)
        }
    };
    (@wrapper [$($attr:tt)*] $name:ident ($($arg:ident),*) [$($q:ident),*] [multipart]) => {
        $($attr)*
        pub fn $name(&self, $($arg: impl Display,)* $($q: impl Into<QueryValue>,)* form: MultipartForm) -> Result<ApiResponse, ApiError> {
            self.request(self::$name($($arg,)* $($q,)* form))
        }
    };

    ($(
        $(#[$attr:meta])*
        fn $name:ident($($arg:ident),*) => $method:ident $path:literal
            $(query($($key:literal = $q:ident),+))?
            $(with $format:ident)?;
    )*) => {
        /// Every endpoint the client knows, in declaration order.
        pub static ENDPOINTS: &[Endpoint] = &[
            $(Endpoint {
                name: stringify!($name),
                method: endpoints!(@method $method),
                path: $path,
                query: &[$($($key),+)?],
                format: endpoints!(@format $($format)?),
            },)*
        ];

        $(
            endpoints!(@builder [$(#[$attr])*] $name ($($arg),*) [$($($key = $q),+)?] $method $path [$($format)?]);
        )*

        impl HelpdeskClient {
            $(
                endpoints!(@wrapper [$(#[$attr])*] $name ($($arg),*) [$($($q),+)?] [$($format)?]);
            )*
        }
    };
}

endpoints! {
    // Auth and settings
    /// Log in with `email` and `password`.
    fn login() => POST "/api/login" with form;
    fn get_email_notification_settings() => GET "/api/settings/notifications/email";
    fn update_email_notification_settings() => PUT "/api/settings/notifications/email" with form;
    /// Settings group by key, e.g. `general`.
    fn get_settings(key) => GET "/api/settings/{key}";
    fn update_settings(key) => PUT "/api/settings/{key}" with json;
    fn get_language(lang) => GET "/api/lang/{lang}";

    // Priorities, statuses and tags
    fn get_priorities() => GET "/api/priorities";
    fn get_statuses() => GET "/api/statuses";
    fn create_status() => POST "/api/statuses" with form;
    fn update_status(id) => PUT "/api/statuses/{id}" with form;
    fn delete_status(id) => DELETE "/api/statuses/{id}";
    fn get_tags() => GET "/api/tags";
    fn create_tag() => POST "/api/tags" with form;
    fn update_tag(id) => PUT "/api/tags/{id}" with form;
    fn delete_tag(id) => DELETE "/api/tags/{id}";

    // Email templates
    fn get_templates() => GET "/api/templates";
    fn get_template(id) => GET "/api/templates/{id}";
    fn create_template() => POST "/api/templates" with json;
    fn update_template(id) => PUT "/api/templates/{id}" with json;
    fn delete_template(id) => DELETE "/api/templates/{id}";

    // OIDC providers
    fn get_all_oidc() => GET "/api/oidc";
    fn get_oidc(id) => GET "/api/oidc/{id}";
    fn create_oidc() => POST "/api/oidc" with json;
    fn update_oidc(id) => PUT "/api/oidc/{id}" with json;
    fn delete_oidc(id) => DELETE "/api/oidc/{id}";

    // Automation rules
    /// Rules of one type, e.g. `new_conversation`.
    fn get_automation_rules() => GET "/api/automation/rules" query("type" = rule_type);
    fn get_automation_rule(id) => GET "/api/automation/rules/{id}";
    fn create_automation_rule() => POST "/api/automation/rules" with json;
    fn update_automation_rule(id) => PUT "/api/automation/rules/{id}" with json;
    /// Flip a rule between enabled and disabled.
    fn toggle_automation_rule(id) => PUT "/api/automation/rules/{id}/toggle";
    fn delete_automation_rule(id) => DELETE "/api/automation/rules/{id}";

    // Roles
    fn get_roles() => GET "/api/roles";
    fn get_role(id) => GET "/api/roles/{id}";
    fn create_role() => POST "/api/roles" with json;
    fn update_role(id) => PUT "/api/roles/{id}" with json;
    fn delete_role(id) => DELETE "/api/roles/{id}";

    // Users
    fn get_users() => GET "/api/users";
    fn get_user(id) => GET "/api/users/{id}";
    fn create_user() => POST "/api/users" with json;
    fn update_user(id) => PUT "/api/users/{id}" with json;
    fn get_current_user() => GET "/api/users/me";
    /// Profile fields and, optionally, a new avatar file.
    fn update_current_user() => PUT "/api/users/me" with multipart;
    fn delete_user_avatar() => DELETE "/api/users/me/avatar";

    // Teams
    fn get_teams() => GET "/api/teams";
    fn get_team(id) => GET "/api/teams/{id}";
    fn create_team() => POST "/api/teams" with form;
    fn update_team(id) => PUT "/api/teams/{id}" with form;

    // Inboxes
    fn get_inboxes() => GET "/api/inboxes";
    fn get_inbox(id) => GET "/api/inboxes/{id}";
    fn create_inbox() => POST "/api/inboxes" with json;
    fn update_inbox(id) => PUT "/api/inboxes/{id}" with json;
    fn toggle_inbox(id) => PUT "/api/inboxes/{id}/toggle";
    fn delete_inbox(id) => DELETE "/api/inboxes/{id}";

    // Conversations
    fn get_conversation(uuid) => GET "/api/conversations/{uuid}";
    fn get_conversation_participants(uuid) => GET "/api/conversations/{uuid}/participants";
    fn upsert_tags(uuid) => POST "/api/conversations/{uuid}/tags" with form;
    /// `assignee_type` is `user` or `team`.
    fn update_assignee(uuid, assignee_type) => PUT "/api/conversations/{uuid}/assignee/{assignee_type}" with form;
    fn update_conversation_status(uuid) => PUT "/api/conversations/{uuid}/status" with form;
    fn update_conversation_priority(uuid) => PUT "/api/conversations/{uuid}/priority" with form;
    fn update_assignee_last_seen(uuid) => PUT "/api/conversations/{uuid}/last-seen";
    fn get_assigned_conversations() => GET "/api/conversations/assigned" query("page" = page, "filter" = filter);
    fn get_team_conversations() => GET "/api/conversations/team" query("page" = page, "filter" = filter);
    fn get_all_conversations() => GET "/api/conversations/all" query("page" = page, "filter" = filter);

    // Messages
    /// One page of a conversation's messages.
    fn get_messages(uuid) => GET "/api/conversations/{uuid}/messages" query("page" = page);
    fn get_message(conversation_uuid, uuid) => GET "/api/conversations/{conversation_uuid}/messages/{uuid}";
    fn send_message(uuid) => POST "/api/conversations/{uuid}/messages" with json;
    /// Requeue a message whose delivery failed.
    fn retry_message(conversation_uuid, uuid) => PUT "/api/conversations/{conversation_uuid}/messages/{uuid}/retry";

    // Canned responses
    fn get_canned_responses() => GET "/api/canned-responses";
    fn create_canned_response() => POST "/api/canned-responses" with form;
    fn update_canned_response(id) => PUT "/api/canned-responses/{id}" with form;
    fn delete_canned_response(id) => DELETE "/api/canned-responses/{id}";

    // Media
    fn upload_media() => POST "/api/media" with multipart;

    // Dashboard
    fn get_global_dashboard_counts() => GET "/api/dashboard/global/counts";
    fn get_global_dashboard_charts() => GET "/api/dashboard/global/charts";
    fn get_user_dashboard_counts() => GET "/api/dashboard/me/counts";
    fn get_user_dashboard_charts() => GET "/api/dashboard/me/charts";
}
