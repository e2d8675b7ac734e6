use std::sync::Arc;

use anyhow::{bail, Context};
use services::viewer::{PointerAction, ViewerKey, ViewerSession};
use services::NavigationController;
use storage_adapters::LocalImageLoader;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};
use ui_adapters::{exercise_title, render_gallery, render_lightbox, render_navigation, HELP};

use crate::commands::{Command, CommandError};
use crate::host::TerminalHost;

pub struct App {
    pub nav: NavigationController,
    pub session: ViewerSession,
    pub host: Arc<TerminalHost>,
    pub loader: Arc<LocalImageLoader>,
}

fn pick<T: Clone>(list: Option<&[T]>, n: usize, what: &str) -> anyhow::Result<T> {
    list.and_then(|items| items.get(n - 1))
        .cloned()
        .with_context(|| format!("there is no {what} numbered {n}"))
}

impl App {
    pub async fn run(&self) -> anyhow::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        println!("{HELP}\n");
        if let Err(e) = self.nav.open().await {
            println!("! {e}");
        }
        self.render()?;

        loop {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let command = match line.parse::<Command>() {
                Ok(Command::Quit) => break,
                Ok(command) => command,
                Err(CommandError::Empty) => continue,
                Err(e) => {
                    println!("! {e}");
                    continue;
                }
            };
            debug!(?command, "command");
            if let Err(e) = self.dispatch(command).await {
                println!("! {e:#}");
            }
            self.render()?;
        }

        self.session.close();
        info!("bye");
        Ok(())
    }

    async fn dispatch(&self, command: Command) -> anyhow::Result<()> {
        let state = self.nav.snapshot();
        match command {
            Command::List | Command::Quit => {}
            Command::Help => println!("{HELP}"),
            Command::Department(n) => {
                let department = pick(state.departments(), n, "department")?;
                self.nav.select_department(department.id).await?;
            }
            Command::Course(n) => {
                let course = pick(state.courses(), n, "course")?;
                self.nav.select_course(course.id)?;
            }
            Command::Type(kind) => {
                self.nav.select_type(kind).await?;
            }
            Command::Year(n) => {
                let year = pick(state.years(), n, "year")?;
                self.nav.select_year(&year).await?;
            }
            Command::Open(n) => {
                let exercise = pick(state.exercises(), n, "exercise")?;
                let exercise = self.nav.select_exercise(exercise.id)?;
                let title = exercise_title(&self.nav.snapshot(), &exercise);
                self.session.open_exercise(exercise.id, title).await?;
            }
            Command::View(n) => match self.session.with_gallery(|g| g.click(n - 1)) {
                None => bail!("open an exercise first"),
                Some(false) => bail!("this exercise has no page {n}"),
                Some(true) => {}
            },
            Command::Left => self.key(ViewerKey::ArrowLeft)?,
            Command::Right => self.key(ViewerKey::ArrowRight)?,
            Command::Escape => self.key(ViewerKey::Escape)?,
            Command::Thumb(n) => {
                self.ensure_lightbox()?;
                self.session
                    .with_gallery(|g| g.lightbox_mut().handle_pointer(PointerAction::Thumbnail(n - 1)));
            }
            Command::Close => self.session.close(),
            // Back closes the viewer before it leaves the current listing.
            Command::Back => {
                if self.session.with_gallery(|_| ()).is_some() {
                    self.session.close();
                } else {
                    self.nav.go_back();
                }
            }
            Command::Retry => {
                self.nav.retry().await?;
            }
        }
        Ok(())
    }

    fn ensure_lightbox(&self) -> anyhow::Result<()> {
        if !self.host.keys_captured() {
            bail!("no page is shown full screen, use `view N`");
        }
        Ok(())
    }

    fn key(&self, key: ViewerKey) -> anyhow::Result<()> {
        self.ensure_lightbox()?;
        self.session.with_gallery(|g| g.lightbox_mut().handle_key(key));
        Ok(())
    }

    fn render(&self) -> anyhow::Result<()> {
        let mut screen = render_navigation(&self.nav.snapshot())?;

        if let Some(view) = self.session.with_gallery(|g| g.view()).flatten() {
            screen.push('\n');
            screen.push_str(&render_gallery(&view)?);
        }
        if let Some(frame) = self.session.with_gallery(|g| g.lightbox().frame()).flatten() {
            let detail = self
                .loader
                .get(&frame.image)
                .map(|page| format!("{}x{}", page.width, page.height));
            screen.push('\n');
            screen.push_str(&render_lightbox(&frame, detail.as_deref())?);
        }
        println!("{screen}");
        Ok(())
    }
}
