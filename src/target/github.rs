use serde::Deserialize;
use serde_json::{json, Value};

use super::{
    CreatedIssue, ExistingProjectItem, ItemPage, Milestone, NewIssue, ProjectInfo, StatusOption,
    TargetClient, TargetError, TargetLabel, TargetUser,
};

const REST_BASE: &str = "https://api.github.com";
const GRAPHQL_URL: &str = "https://api.github.com/graphql";
const PAGE_SIZE: usize = 100;

pub struct GitHubTarget {
    token: String,
    owner: String,
    repo: String,
    client: reqwest::Client,
}

impl GitHubTarget {
    pub fn new(token: String, owner: String, repo: String) -> Self {
        Self {
            token,
            owner,
            repo,
            client: reqwest::Client::new(),
        }
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "boardport")
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, TargetError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(TargetError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn graphql(&self, query: &str, variables: Value) -> Result<Value, TargetError> {
        let resp = self
            .request(reqwest::Method::POST, GRAPHQL_URL.to_string())
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;
        let body: Value = Self::check(resp).await?.json().await?;
        if let Some(errors) = body.get("errors").and_then(Value::as_array) {
            if !errors.is_empty() {
                let message = errors
                    .iter()
                    .filter_map(|e| e.get("message").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(TargetError::Api {
                    status: 200,
                    message,
                });
            }
        }
        Ok(body)
    }

    fn repo_url(&self, tail: &str) -> String {
        format!("{REST_BASE}/repos/{}/{}/{tail}", self.owner, self.repo)
    }
}

#[derive(Deserialize)]
struct GhLabel {
    id: u64,
    name: String,
    color: Option<String>,
}

#[derive(Deserialize)]
struct GhMilestone {
    id: u64,
    number: u64,
    title: String,
}

#[derive(Deserialize)]
struct GhUser {
    id: u64,
    login: String,
}

#[derive(Deserialize)]
struct GhIssue {
    number: u64,
    node_id: String,
}

const PROJECT_QUERY: &str = r#"
query($owner: String!, $number: Int!) {
  repositoryOwner(login: $owner) {
    ... on User { projectV2(number: $number) { ...project } }
    ... on Organization { projectV2(number: $number) { ...project } }
  }
}
fragment project on ProjectV2 {
  id
  title
  field(name: "Status") {
    ... on ProjectV2SingleSelectField {
      id
      options { id name color }
    }
  }
}"#;

const ITEMS_QUERY: &str = r#"
query($project: ID!, $cursor: String) {
  node(id: $project) {
    ... on ProjectV2 {
      items(first: 100, after: $cursor) {
        pageInfo { hasNextPage endCursor }
        nodes {
          id
          content { ... on Issue { number title } }
          fieldValueByName(name: "Status") {
            ... on ProjectV2ItemFieldSingleSelectValue { name }
          }
        }
      }
    }
  }
}"#;

const ADD_ITEM_MUTATION: &str = r#"
mutation($project: ID!, $content: ID!) {
  addProjectV2ItemById(input: { projectId: $project, contentId: $content }) {
    item { id }
  }
}"#;

const SET_FIELD_MUTATION: &str = r#"
mutation($project: ID!, $item: ID!, $field: ID!, $option: String!) {
  updateProjectV2ItemFieldValue(input: {
    projectId: $project,
    itemId: $item,
    fieldId: $field,
    value: { singleSelectOptionId: $option }
  }) {
    projectV2Item { id }
  }
}"#;

#[async_trait::async_trait]
impl TargetClient for GitHubTarget {
    async fn list_labels(&self) -> Result<Vec<TargetLabel>, TargetError> {
        let mut labels = Vec::new();
        let mut page = 1usize;
        loop {
            let url = format!("{}?per_page={PAGE_SIZE}&page={page}", self.repo_url("labels"));
            let resp = self.request(reqwest::Method::GET, url).send().await?;
            let batch: Vec<GhLabel> = Self::check(resp).await?.json().await?;
            let done = batch.len() < PAGE_SIZE;
            labels.extend(batch.into_iter().map(|l| TargetLabel {
                id: l.id,
                name: l.name,
                color: l.color,
            }));
            if done {
                return Ok(labels);
            }
            page += 1;
        }
    }

    async fn list_milestones(&self) -> Result<Vec<Milestone>, TargetError> {
        let url = format!(
            "{}?state=all&per_page={PAGE_SIZE}",
            self.repo_url("milestones")
        );
        let resp = self.request(reqwest::Method::GET, url).send().await?;
        let milestones: Vec<GhMilestone> = Self::check(resp).await?.json().await?;
        Ok(milestones
            .into_iter()
            .map(|m| Milestone {
                id: m.id,
                number: m.number,
                title: m.title,
            })
            .collect())
    }

    async fn create_label(&self, name: &str, color: Option<&str>) -> Result<(), TargetError> {
        let mut body = json!({ "name": name });
        if let Some(color) = color {
            body["color"] = json!(color);
        }
        let resp = self
            .request(reqwest::Method::POST, self.repo_url("labels"))
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let message = resp.text().await.unwrap_or_default();
        if status.as_u16() == 422 && message.contains("already_exists") {
            return Err(TargetError::AlreadyExists(format!("label \"{name}\"")));
        }
        Err(TargetError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn lookup_user(&self, login: &str) -> Result<TargetUser, TargetError> {
        let url = format!("{REST_BASE}/users/{}", urlencoding::encode(login));
        let resp = self.request(reqwest::Method::GET, url).send().await?;
        if resp.status().as_u16() == 404 {
            return Err(TargetError::NotFound(format!("user \"{login}\"")));
        }
        let user: GhUser = Self::check(resp).await?.json().await?;
        Ok(TargetUser {
            id: user.id,
            login: user.login,
        })
    }

    async fn fetch_project(&self, number: u64) -> Result<ProjectInfo, TargetError> {
        let body = self
            .graphql(
                PROJECT_QUERY,
                json!({ "owner": self.owner, "number": number }),
            )
            .await?;
        let project = &body["data"]["repositoryOwner"]["projectV2"];
        if project.is_null() {
            return Err(TargetError::NotFound(format!("project {number}")));
        }
        let field = &project["field"];
        let status_field_id = field["id"]
            .as_str()
            .ok_or_else(|| TargetError::NotFound(format!("Status field on project {number}")))?
            .to_string();
        let status_options = field["options"]
            .as_array()
            .map(|options| {
                options
                    .iter()
                    .filter_map(|o| {
                        Some(StatusOption {
                            id: o["id"].as_str()?.to_string(),
                            name: o["name"].as_str()?.to_string(),
                            color: o["color"].as_str().map(str::to_string),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(ProjectInfo {
            id: project["id"].as_str().unwrap_or_default().to_string(),
            title: project["title"].as_str().unwrap_or_default().to_string(),
            status_field_id,
            status_options,
        })
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue, TargetError> {
        let mut body = json!({
            "title": issue.title,
            "body": issue.body,
            "labels": issue.labels,
            "assignees": issue.assignees,
        });
        if let Some(milestone) = issue.milestone {
            body["milestone"] = json!(milestone);
        }
        let resp = self
            .request(reqwest::Method::POST, self.repo_url("issues"))
            .json(&body)
            .send()
            .await?;
        let created: GhIssue = Self::check(resp).await?.json().await?;
        Ok(CreatedIssue {
            number: created.number,
            node_id: created.node_id,
        })
    }

    async fn add_comment(&self, issue_number: u64, body: &str) -> Result<(), TargetError> {
        let url = self.repo_url(&format!("issues/{issue_number}/comments"));
        let resp = self
            .request(reqwest::Method::POST, url)
            .json(&json!({ "body": body }))
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn add_to_project(
        &self,
        project_id: &str,
        issue_node_id: &str,
    ) -> Result<String, TargetError> {
        let body = self
            .graphql(
                ADD_ITEM_MUTATION,
                json!({ "project": project_id, "content": issue_node_id }),
            )
            .await?;
        body["data"]["addProjectV2ItemById"]["item"]["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| TargetError::Api {
                status: 200,
                message: "addProjectV2ItemById returned no item id".into(),
            })
    }

    async fn set_item_status(
        &self,
        project_id: &str,
        item_id: &str,
        field_id: &str,
        option_id: &str,
    ) -> Result<(), TargetError> {
        self.graphql(
            SET_FIELD_MUTATION,
            json!({
                "project": project_id,
                "item": item_id,
                "field": field_id,
                "option": option_id,
            }),
        )
        .await?;
        Ok(())
    }

    async fn project_items(
        &self,
        project_id: &str,
        cursor: Option<&str>,
    ) -> Result<ItemPage, TargetError> {
        let body = self
            .graphql(ITEMS_QUERY, json!({ "project": project_id, "cursor": cursor }))
            .await?;
        let items_node = &body["data"]["node"]["items"];
        let items = items_node["nodes"]
            .as_array()
            .map(|nodes| {
                nodes
                    .iter()
                    .filter_map(|node| {
                        // Items whose content is not an issue (drafts, PRs)
                        // have no number and are skipped.
                        let number = node["content"]["number"].as_u64()?;
                        Some(ExistingProjectItem {
                            id: node["id"].as_str()?.to_string(),
                            issue_number: number,
                            title: node["content"]["title"].as_str()?.to_string(),
                            status: node["fieldValueByName"]["name"]
                                .as_str()
                                .map(str::to_string),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        let next_cursor = if items_node["pageInfo"]["hasNextPage"].as_bool() == Some(true) {
            items_node["pageInfo"]["endCursor"]
                .as_str()
                .map(str::to_string)
        } else {
            None
        };
        Ok(ItemPage { items, next_cursor })
    }
}
