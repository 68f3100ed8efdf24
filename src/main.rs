use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use taskdesk::api::ApiClient;
use taskdesk::chat::{self, ChatPanel};
use taskdesk::config;
use taskdesk::error::ApiError;
use taskdesk::logger::Logger;
use taskdesk::models::{Task, TaskUpdate};
use taskdesk::session::{Session, SessionState};
use taskdesk::tasks::{Filter, TaskList};
use taskdesk::token::TokenStore;

fn data_dir() -> PathBuf {
  std::env::var_os("HOME")
    .map(PathBuf::from)
    .or_else(|| std::env::var_os("USERPROFILE").map(PathBuf::from))
    .unwrap_or_else(|| PathBuf::from("."))
    .join(".taskdesk")
}

// None on EOF, so piped input terminates the loop cleanly.
fn prompt(label: &str) -> anyhow::Result<Option<String>> {
  print!("{label}");
  std::io::stdout().flush()?;
  let mut line = String::new();
  let read = std::io::stdin().lock().read_line(&mut line)?;
  if read == 0 {
    return Ok(None);
  }
  Ok(Some(line.trim().to_string()))
}

// "title :: description" - description optional.
fn split_title(input: &str) -> (String, Option<String>) {
  match input.split_once("::") {
    Some((title, desc)) => (title.trim().to_string(), Some(desc.trim().to_string())),
    None => (input.trim().to_string(), None),
  }
}

fn print_tasks(tasks: &[&Task]) {
  for task in tasks {
    let mark = if task.completed { "x" } else { " " };
    match task.description.as_deref() {
      Some(desc) if !desc.is_empty() => println!("  [{mark}] #{} {} - {desc}", task.id, task.title),
      _ => println!("  [{mark}] #{} {}", task.id, task.title),
    }
  }
}

struct App {
  api: ApiClient,
  session: Arc<Session>,
  logger: Logger,
  list: TaskList,
}

impl App {
  // Every failed call funnels through here; a 401 already expired the
  // session inside the executor, so only the message differs.
  fn report(&mut self, context: &str, err: &ApiError) {
    self.logger.error(&format!("{context}: {err}"));
    if self.session.take_redirect() {
      // The stale list must not feed further mutations.
      self.list = TaskList::new();
      println!("session expired - please `login` again");
    } else {
      println!("{context} failed, try again");
    }
  }

  fn guard(&mut self) -> bool {
    if self.session.guard() == SessionState::Authenticated {
      return true;
    }
    self.session.take_redirect();
    self.list = TaskList::new();
    println!("not logged in - use `login` first");
    false
  }

  async fn login(&mut self) -> anyhow::Result<()> {
    let (Some(username), Some(password)) = (prompt("username: ")?, prompt("password: ")?) else {
      return Ok(());
    };
    match self.api.login(&username, &password).await {
      Ok(token) => {
        self.session.establish(&token)?;
        self.logger.info(&format!("logged in as {username}"));
        println!("logged in");
      }
      Err(err) => self.report("login", &err),
    }
    Ok(())
  }

  async fn signup(&mut self) -> anyhow::Result<()> {
    let (Some(email), Some(username), Some(password)) = (
      prompt("email: ")?,
      prompt("username: ")?,
      prompt("password: ")?,
    ) else {
      return Ok(());
    };
    match self.api.signup(&email, &username, &password).await {
      Ok(()) => println!("account created - use `login`"),
      Err(err) => self.report("signup", &err),
    }
    Ok(())
  }

  async fn refresh(&mut self) {
    match self.api.tasks().await {
      Ok(tasks) => self.list.replace_all(tasks),
      Err(err) => self.report("task list", &err),
    }
  }

  async fn list_cmd(&mut self, arg: Option<&str>) {
    if !self.guard() {
      return;
    }
    let filter = match arg {
      None => Filter::All,
      Some(value) => match Filter::parse(value) {
        Some(f) => f,
        None => {
          println!("unknown filter {value:?} (all | active | completed)");
          return;
        }
      },
    };
    self.refresh().await;
    let (total, active, completed) = self.list.counts();
    println!("{total} total, {active} active, {completed} completed");
    print_tasks(&self.list.filtered(filter));
  }

  async fn find(&mut self, term: &str) {
    if !self.guard() {
      return;
    }
    self.refresh().await;
    print_tasks(&self.list.search(term));
  }

  async fn add(&mut self, rest: &str) {
    if !self.guard() {
      return;
    }
    let (title, description) = split_title(rest);
    if title.is_empty() {
      println!("usage: add <title> [:: description]");
      return;
    }
    match self.api.create_task(&title, description.as_deref()).await {
      Ok(task) => {
        println!("created #{}", task.id);
        self.list.push(task);
      }
      Err(err) => self.report("create", &err),
    }
  }

  async fn edit(&mut self, id: i64, rest: &str) {
    if !self.guard() {
      return;
    }
    let (title, description) = split_title(rest);
    if title.is_empty() {
      println!("usage: edit <id> <title> [:: description]");
      return;
    }
    let Some(current) = self.list.find(id).cloned() else {
      println!("no task #{id} loaded - run `list` first");
      return;
    };
    if !self.list.begin_save(id) {
      return;
    }
    let update = TaskUpdate {
      title: title.clone(),
      description: description.clone(),
      completed: current.completed,
    };
    match self.api.update_task(id, &update).await {
      Ok(server) => {
        self.list.apply_update(id, server, &title, description.as_deref());
        println!("updated #{id}");
      }
      Err(err) => self.report("update", &err),
    }
    self.list.end_save();
  }

  async fn done(&mut self, id: i64) {
    if !self.guard() {
      return;
    }
    if !self.list.begin_toggle(id) {
      return;
    }
    match self.api.toggle_complete(id).await {
      Ok(server) => {
        self.list.apply_toggle(id, server);
        println!("toggled #{id}");
      }
      Err(err) => self.report("toggle", &err),
    }
    self.list.end_toggle();
  }

  async fn remove(&mut self, id: i64) {
    if !self.guard() {
      return;
    }
    if !self.list.begin_delete(id) {
      return;
    }
    match self.api.delete_task(id).await {
      Ok(()) => {
        self.list.remove(id);
        println!("deleted #{id}");
      }
      Err(err) => self.report("delete", &err),
    }
    self.list.end_delete();
  }

  async fn me(&mut self) {
    if !self.guard() {
      return;
    }
    match self.api.me().await {
      Ok(user_id) => println!("user id: {user_id}"),
      Err(err) => self.report("me", &err),
    }
  }

  async fn chat_loop(&mut self) -> anyhow::Result<()> {
    let Some(user_id) = chat::resolve_user(&self.api).await else {
      self.session.take_redirect();
      println!("not logged in - use `login` first");
      return Ok(());
    };

    let mut panel = ChatPanel::new(Some(user_id));
    println!("assistant: {}", chat::GREETING);
    println!("(type /back to leave the chat)");

    loop {
      let Some(line) = prompt("you: ")? else {
        return Ok(());
      };
      if line == "/back" || line == "/quit" {
        return Ok(());
      }
      let before = panel.messages().len();
      panel.send(&self.api, &line).await;
      for message in &panel.messages()[before..] {
        if message.role == "assistant" {
          println!("assistant: {}", message.content);
          if !message.tool_calls.is_empty() {
            println!("  (used {} tool call(s))", message.tool_calls.len());
          }
        }
      }
      if self.session.take_redirect() {
        println!("session expired - please `login` again");
        return Ok(());
      }
    }
  }
}

const HELP: &str = "commands:
  signup                 create an account
  login                  log in and store the session token
  logout                 drop the session token
  me                     show the authenticated user id
  list [all|active|completed]
  find <term>            search titles and descriptions
  add <title> [:: description]
  edit <id> <title> [:: description]
  done <id>              toggle completion
  rm <id>                delete a task
  chat                   talk to the assistant
  quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let dir = data_dir();
  std::fs::create_dir_all(&dir)?;
  let logger = Logger::new(&dir.join("taskdesk.log"))?;

  let resolved = config::api_base_from_env()?;
  if resolved.defaulted {
    logger.warn(&format!(
      "API base URL not configured, using {}",
      resolved.base
    ));
    eprintln!(
      "warning: API base URL not configured, using {} \
       (set TASKDESK_API_BASE_URL or TASKDESK_API_URL to override)",
      resolved.base
    );
  }
  logger.info(&format!("taskdesk starting, backend {}", resolved.base));

  let session = Arc::new(Session::new(TokenStore::new(dir.join("token"))));
  let api = ApiClient::new(resolved.base, session.clone());
  let mut app = App {
    api,
    session,
    logger,
    list: TaskList::new(),
  };

  println!("taskdesk - `help` for commands");
  loop {
    let Some(line) = prompt("> ")? else {
      break;
    };
    let (command, rest) = match line.split_once(char::is_whitespace) {
      Some((c, r)) => (c, r.trim()),
      None => (line.as_str(), ""),
    };

    match command {
      "" => {}
      "help" => println!("{HELP}"),
      "signup" => app.signup().await?,
      "login" => app.login().await?,
      "logout" => {
        app.session.logout()?;
        app.list = TaskList::new();
        println!("logged out");
      }
      "me" => app.me().await,
      "list" => {
        let arg = if rest.is_empty() { None } else { Some(rest) };
        app.list_cmd(arg).await;
      }
      "find" => {
        if rest.is_empty() {
          println!("usage: find <term>");
        } else {
          app.find(rest).await;
        }
      }
      "add" => app.add(rest).await,
      "edit" => match rest.split_once(char::is_whitespace) {
        Some((id, body)) => match id.parse::<i64>() {
          Ok(id) => app.edit(id, body.trim()).await,
          Err(_) => println!("usage: edit <id> <title> [:: description]"),
        },
        None => println!("usage: edit <id> <title> [:: description]"),
      },
      "done" => match rest.parse::<i64>() {
        Ok(id) => app.done(id).await,
        Err(_) => println!("usage: done <id>"),
      },
      "rm" => match rest.parse::<i64>() {
        Ok(id) => app.remove(id).await,
        Err(_) => println!("usage: rm <id>"),
      },
      "chat" => app.chat_loop().await?,
      "quit" | "exit" => break,
      other => println!("unknown command {other:?} - `help` for commands"),
    }
  }

  app.logger.info("taskdesk exiting");
  Ok(())
}
