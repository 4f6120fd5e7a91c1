//! List content from the store

use anyhow::Result;

use crate::content::ContentGateway;
use crate::helpers::date_xml;
use crate::Site;

/// List documents of one family
pub async fn run(site: &Site, content_type: &str) -> Result<()> {
    let gateway = ContentGateway::new(&site.config.content_store)?;

    for line in lines(&gateway, content_type).await? {
        println!("{}", line);
    }
    Ok(())
}

/// Listing output, one entry per line after a heading
async fn lines(gateway: &ContentGateway, content_type: &str) -> Result<Vec<String>> {
    let mut out = Vec::new();

    match content_type {
        "post" | "posts" => {
            let posts = gateway.try_fetch_all::<crate::content::Post>().await?;
            out.push(format!("Posts ({}):", posts.len()));
            for post in posts {
                let date = post
                    .display_date()
                    .map(|d| date_xml(&d))
                    .unwrap_or_else(|| "-".to_string());
                out.push(format!("  {} - {} [{}]", date, post.title, post.slug()));
            }
        }
        "project" | "projects" => {
            let projects = gateway.try_fetch_all::<crate::content::Project>().await?;
            out.push(format!("Projects ({}):", projects.len()));
            for project in projects {
                out.push(format!("  {} [{}]", project.title, project.slug()));
            }
        }
        "team" | "member" | "members" => {
            let members = gateway.try_fetch_all::<crate::content::TeamMember>().await?;
            out.push(format!("Team members ({}):", members.len()));
            for member in members {
                let rank = member
                    .rank
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "-".to_string());
                out.push(format!("  #{} {} [{}]", rank, member.name, member.slug()));
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, project, team",
                content_type
            );
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContentStoreConfig;
    use httpmock::prelude::*;
    use serde_json::json;

    fn gateway(server: &MockServer) -> ContentGateway {
        ContentGateway::new(&ContentStoreConfig {
            endpoint: Some(server.base_url()),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_team() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).json_body(json!({"result": [
                    {"_id": "m1", "name": "Asha Rao", "slug": {"current": "asha-rao"}, "rank": 1},
                    {"_id": "m2", "name": "Ben Ode", "slug": {"current": "ben-ode"}, "rank": null}
                ]}));
            })
            .await;

        let out = lines(&gateway(&server), "team").await.unwrap();
        assert_eq!(
            out,
            vec![
                "Team members (2):",
                "  #1 Asha Rao [asha-rao]",
                "  #- Ben Ode [ben-ode]"
            ]
        );
    }

    #[tokio::test]
    async fn test_list_reports_backend_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(503).body("unavailable");
            })
            .await;

        assert!(lines(&gateway(&server), "posts").await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_type() {
        let server = MockServer::start_async().await;
        let err = lines(&gateway(&server), "tags").await.unwrap_err();
        assert!(err.to_string().contains("Unknown type"));
    }
}
