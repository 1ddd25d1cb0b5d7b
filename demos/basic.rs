//! Parameter loading demo — users and their posts behind loaded params.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/1
//!   curl http://localhost:3000/users/1/posts/2
//!   curl http://localhost:3000/users/9      # not found
//!   curl http://localhost:3000/users/abc    # load error

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use tsu_params::{BoxError, LoadedParams, Param, Params, Request, Response, Router, Server};

#[derive(Debug)]
struct User {
    id: u64,
    name: String,
}

#[derive(Debug)]
struct Post {
    id: u64,
    author: u64,
    title: String,
}

#[derive(Default)]
struct Db {
    users: HashMap<u64, Arc<User>>,
    posts: HashMap<u64, Arc<Post>>,
}

impl Db {
    fn seeded() -> Self {
        let mut db = Self::default();
        db.users.insert(1, Arc::new(User { id: 1, name: "alice".into() }));
        db.posts.insert(2, Arc::new(Post { id: 2, author: 1, title: "hello".into() }));
        db
    }
}

#[tokio::main]
async fn main() -> Result<(), tsu_params::Error> {
    tracing_subscriber::fmt::init();

    let db = Arc::new(Db::seeded());
    let users = Arc::clone(&db);
    let posts = Arc::clone(&db);

    let params = Params::new()
        .param(
            "user",
            Param::new()
                .load(move |raw, _req| {
                    let db = Arc::clone(&users);
                    async move {
                        let id: u64 = raw.unwrap_or_default().parse()?;
                        Ok::<_, BoxError>(db.users.get(&id).cloned())
                    }
                })
                .not_found(|_req, raw| (StatusCode::NOT_FOUND, format!("no user {}", raw.unwrap_or(""))))
                .load_error(|_req, err| (StatusCode::BAD_REQUEST, format!("bad user id: {err}")))
                .add_to_boot(),
        )
        .param(
            "post",
            Param::new()
                .load(move |raw, req: &Request| {
                    let db = Arc::clone(&posts);
                    let author = req.loaded_param_as::<Arc<User>>("user").map(|u| u.id);
                    async move {
                        let id: u64 = raw.unwrap_or_default().parse()?;
                        let post = db.posts.get(&id).filter(|p| Some(p.author) == author).cloned();
                        Ok::<_, BoxError>(post)
                    }
                })
                .not_found(|_req, _raw| StatusCode::NOT_FOUND),
        );

    let app = Router::new()
        .on_with(Method::GET, "/users/{user}", [params.loader("user")?], show_user)
        .on_with(
            Method::GET,
            "/users/{user}/posts/{post}",
            [params.loader("user")?, params.loader("post")?],
            show_post,
        );

    Server::bind("0.0.0.0:3000").serve(app).await
}

async fn show_user(req: Request) -> Response {
    match req.loaded_param_as::<Arc<User>>("user") {
        Some(user) => Response::json(format!(r#"{{"id":{},"name":"{}"}}"#, user.id, user.name).into_bytes()),
        None => Response::status(StatusCode::NOT_FOUND),
    }
}

async fn show_post(req: Request) -> Response {
    let picked = req.pick_loaded_params(["user", "post"]);
    let post = picked.get("post").and_then(|v| v.downcast_ref::<Arc<Post>>());
    match post {
        Some(post) => Response::json(format!(r#"{{"id":{},"title":"{}"}}"#, post.id, post.title).into_bytes()),
        None => Response::status(StatusCode::NOT_FOUND),
    }
}
