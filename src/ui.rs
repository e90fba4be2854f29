// UI layer: interactive menus built on `dialoguer`.
// Every flow is a small synchronous loop: prompt, call the catalog or the
// account store, print the outcome, loop. Remote failures are printed and
// the user is returned to the surrounding menu.

use std::io::{self, stdout, BufRead, Write};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;

use crate::auth::{Accounts, AuthError, Session};
use crate::book::{Book, Field, HEADERS};
use crate::catalog::{validate_field, BookUpdate, CatalogError, SearchField};
use crate::config::Config;
use crate::lookup::BooksClient;
use crate::paging::{PageAction, Pager};
use crate::store::{Workbook, Worksheet};
use crate::table;
use crate::validate::{validate_password, validate_username};

const MESSAGE_DELAY: Duration = Duration::from_secs(2);

const BANNER: &str = r#"
                        .-~~~~~~~~~-._       _.-~~~~~~~~~-.
                    __.'              ~.   .~              `.__
                .'//                  \./                  \\`.
                .'//                     |                     \\`.
            .'// .-~"""""""~~~~-._     |     _,-~~~~"""""""~-. \\`.
            .'//.-"                 `-.  |  .-'                 "-.\\`.
        .'//______.============-..   \ | /   ..-============.______\\`.
        .'______________________________\|/______________________________`.
                ______             _    _    _
                | ___ \           | |  | |  | |
                | |_/ / ___   ___ | | _| |  | | ___  _ __ _ __ ___
                | ___ \/ _ \ / _ \| |/ | |/\| |/ _ \| '__| '_ ` _ \
                | |_/ | (_) | (_) |   <\  /\  | (_) | |  | | | | | |
                \____/ \___/ \___/|_|\_\\/  \/ \___/|_|  |_| |_| |_|
"#;

/// Entry point of the interactive session: title screen, account menu,
/// then the book menu of the logged-in user. Returns when the user quits.
pub fn main_menu<W: Workbook>(workbook: &W, config: &Config) -> Result<()> {
    let books = BooksClient::new(&config.books_url).context("Failed to build books client")?;
    let accounts = {
        let spinner = spinner("Connecting...")?;
        let accounts = Accounts::open(workbook, &config.users_sheet);
        spinner.finish_and_clear();
        accounts.context("Failed to open the users sheet")?
    };

    title_screen()?;

    let session = match account_menu(&accounts)? {
        Some(session) => session,
        None => return Ok(()),
    };

    loop {
        clear_screen()?;
        println!("{}", format!("Welcome to BookWorm, {}!", session.username).yellow());
        println!();
        let items = [
            "Add a book",
            "Remove a book",
            "Update a book",
            "Search for a book",
            "Display all books",
            "Quit",
        ];
        match choose("Please select an option below", &items)? {
            0 => add_book_menu(&session, &books)?,
            1 => remove_book(&session)?,
            2 => update_book(&session)?,
            3 => search_menu(&session, config.page_size)?,
            4 => display_all(&session, config.page_size)?,
            _ => {
                println!("Goodbye!");
                break;
            }
        }
    }
    Ok(())
}

fn title_screen() -> Result<()> {
    clear_screen()?;
    println!("{}", BANNER.green());
    print!("{:^80}", "Press Enter to continue...");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}

/// Login / create user loop. `None` means the user chose to quit.
fn account_menu<W: Workbook>(accounts: &Accounts<'_, W>) -> Result<Option<Session<W::Sheet>>> {
    loop {
        clear_screen()?;
        match choose("Choose an option", &["Login", "Create User", "Quit"])? {
            0 => {
                if let Some(session) = handle_login(accounts)? {
                    return Ok(Some(session));
                }
            }
            1 => handle_create_user(accounts)?,
            _ => return Ok(None),
        }
    }
}

/// Collect and check credentials for a new account, then create it.
fn handle_create_user<W: Workbook>(accounts: &Accounts<'_, W>) -> Result<()> {
    let (username, password, confirm) = loop {
        clear_screen()?;
        heading("CREATE A NEW USER");
        println!("Leave the username empty to cancel.\n");
        let username = ask("Enter a username")?;
        if username.is_empty() {
            return Ok(());
        }
        if let Err(e) = validate_username(&username) {
            notice(&format!("{} Please try again.", e));
            continue;
        }
        let password = secret("Password")?;
        let confirm = secret("Confirm password")?;
        if let Err(e) = validate_password(&password, &confirm) {
            notice(&format!("{} Please try again.", e));
            continue;
        }
        break (username, password, confirm);
    };

    let spinner = spinner("Creating account...")?;
    let result = accounts.create_user(&username, &password, &confirm);
    spinner.finish_and_clear();
    match result {
        Ok(()) => notice("User account created successfully!"),
        Err(AuthError::UserExists(_)) => notice("Error: a sheet with that name already exists"),
        Err(e) => notice(&format!("An error occurred: {}", e)),
    }
    Ok(())
}

/// Ask for credentials until they are accepted or the user leaves the
/// username empty.
fn handle_login<W: Workbook>(accounts: &Accounts<'_, W>) -> Result<Option<Session<W::Sheet>>> {
    loop {
        clear_screen()?;
        heading("LOGIN TO YOUR LIBRARY");
        println!("Leave the username empty to cancel.\n");
        let username = ask("Enter your username")?;
        if username.is_empty() {
            return Ok(None);
        }
        let password = secret("Enter your password")?;

        let spinner = spinner("Logging in...")?;
        let result = accounts.login(&username, &password);
        spinner.finish_and_clear();
        match result {
            Ok(session) => {
                notice("Logged in successfully!");
                return Ok(Some(session));
            }
            Err(e @ (AuthError::UnknownUser | AuthError::IncorrectPassword)) => {
                notice(&format!("Error: {}. Please try again.", e));
            }
            Err(e) => notice(&format!("Error: {}", e)),
        }
    }
}

fn add_book_menu<S: Worksheet>(session: &Session<S>, books: &BooksClient) -> Result<()> {
    clear_screen()?;
    heading("ADD BOOK");
    println!();
    let items = ["Add book manually", "Look up book by ISBN", "Back"];
    match choose("How would you like to add a book?", &items)? {
        0 => add_book(session),
        1 => add_book_isbn(session, books),
        _ => Ok(()),
    }
}

fn add_book<S: Worksheet>(session: &Session<S>) -> Result<()> {
    loop {
        clear_screen()?;
        heading("ADD NEW BOOK");
        println!("Enter the book details below:");

        let mut book = Book::default();
        for field in Field::ALL {
            let prompt = match field {
                Field::Year => "Year (optional)",
                other => other.label(),
            };
            let value = loop {
                let value = ask(prompt)?;
                match validate_field(field, &value) {
                    Ok(()) => break value,
                    Err(e) => println!("{}", e),
                }
            };
            match field {
                Field::Title => book.title = value,
                Field::Author => book.author = value,
                Field::Year => book.year = value,
                Field::Genre => book.genre = value,
            }
        }

        let spinner = spinner("Saving book...")?;
        let result = session.catalog.add(&book);
        spinner.finish_and_clear();
        match result {
            Ok(()) => notice("Book added successfully!"),
            Err(e) => notice(&format!("Error: {}", e)),
        }

        if !confirm("Do you want to add another book?")? {
            return Ok(());
        }
    }
}

fn add_book_isbn<S: Worksheet>(session: &Session<S>, books: &BooksClient) -> Result<()> {
    loop {
        clear_screen()?;
        heading("ADD BOOK BY ISBN");
        println!("Enter 'q' to go back\n");

        let isbn = ask("Enter the book's ISBN")?;
        if isbn == "q" || isbn.is_empty() {
            return Ok(());
        }

        let spinner = spinner("Looking up ISBN...")?;
        let found = books.lookup(&isbn);
        spinner.finish_and_clear();
        let book = match found {
            Ok(book) => book,
            Err(e) => {
                debug!("lookup of {} failed: {}", isbn, e);
                notice(&e.to_string());
                continue;
            }
        };

        match session.catalog.add_unchecked(&book) {
            Ok(()) => notice(&format!("{} by {} added successfully!", book.title, book.author)),
            Err(e) => {
                notice(&format!("Error: {}", e));
                continue;
            }
        }

        if !confirm("Do you want to add another book?")? {
            return Ok(());
        }
    }
}

fn remove_book<S: Worksheet>(session: &Session<S>) -> Result<()> {
    loop {
        clear_screen()?;
        heading("REMOVE BOOK FROM DATABASE");
        let title = ask("Enter the title of the book you want to remove\n(q to return to main menu)")?;
        if title == "q" {
            return Ok(());
        }

        let spinner = spinner("Removing book...")?;
        let result = session.catalog.remove(&title);
        spinner.finish_and_clear();
        match result {
            Ok(_) => {
                notice("Book removed successfully!");
                if !confirm("Do you want to remove another book?")? {
                    return Ok(());
                }
            }
            Err(CatalogError::NotFound(_)) => {
                notice("The book is not in the database. Please try again.")
            }
            Err(e) => notice(&format!("Error: {}", e)),
        }
    }
}

fn update_book<S: Worksheet>(session: &Session<S>) -> Result<()> {
    loop {
        clear_screen()?;
        heading("UPDATE BOOK IN DATABASE");
        let title = ask("Enter the title of the book you want to update\n(q to return to main menu)")?;
        if title == "q" {
            return Ok(());
        }

        let current = match session.catalog.find(&title) {
            Ok(Some((_, book))) => book,
            Ok(None) => {
                notice(&format!("The book '{}' was not found in the database.", title));
                continue;
            }
            Err(e) => {
                notice(&format!("Error: {}", e));
                continue;
            }
        };
        println!("{}", table::render(&table_headers(), &[current.to_row()]));

        let mut update = BookUpdate::default();
        for field in Field::ALL {
            let prompt = format!(
                "Enter the new {} (or press Enter to keep existing)",
                field.label().to_lowercase()
            );
            loop {
                let value = ask(&prompt)?;
                if value.is_empty() {
                    break;
                }
                match validate_field(field, &value) {
                    Ok(()) => {
                        update.set(field, value);
                        break;
                    }
                    Err(e) => println!("{}", e),
                }
            }
        }

        let spinner = spinner("Updating book...")?;
        let result = session.catalog.update(&title, &update);
        spinner.finish_and_clear();
        match result {
            Ok(_) => notice("Book updated successfully!"),
            Err(e) => notice(&format!("Error: {}", e)),
        }
        return Ok(());
    }
}

fn search_menu<S: Worksheet>(session: &Session<S>, page_size: usize) -> Result<()> {
    loop {
        clear_screen()?;
        heading("SEARCH FOR BOOKS");
        println!();
        let items = ["Search by Title", "Search by Author", "Search by Genre", "Back"];
        let (field, prompt, what) = match choose("What would you like to search for?", &items)? {
            0 => (SearchField::Title, "Enter the title", "with the title"),
            1 => (SearchField::Author, "Enter the author's name", "by the author"),
            2 => (SearchField::Genre, "Enter the genre", "in genre"),
            _ => return Ok(()),
        };

        let query = ask(&format!("{} (just hit enter to go back)", prompt))?;
        if query.is_empty() {
            continue;
        }

        let spinner = spinner("Searching...")?;
        let result = session.catalog.search(field, &query);
        spinner.finish_and_clear();
        match result {
            Ok(found) if found.is_empty() => notice(&format!("No books found {} '{}'.", what, query)),
            Ok(found) => display_books(&found, "SEARCH RESULTS", page_size)?,
            Err(e) => notice(&format!("Error: {}", e)),
        }
    }
}

fn display_all<S: Worksheet>(session: &Session<S>, page_size: usize) -> Result<()> {
    let spinner = spinner("Loading books...")?;
    let result = session.catalog.all();
    spinner.finish_and_clear();
    match result {
        Ok(books) if books.is_empty() => notice("There are no books in your library yet."),
        Ok(books) => display_books(&books, "BOOK INVENTORY", page_size)?,
        Err(e) => notice(&format!("Error: {}", e)),
    }
    Ok(())
}

/// Show `books` a page at a time, navigating with n/p/q.
fn display_books(books: &[Book], title: &str, page_size: usize) -> Result<()> {
    let mut pager = Pager::new(books.len(), page_size);
    loop {
        clear_screen()?;
        heading(title);
        let rows: Vec<Vec<String>> = books[pager.range()].iter().map(Book::to_row).collect();
        println!("{}", table::render(&table_headers(), &rows));
        if pager.total_pages() > 1 {
            println!("\nPage {} of {}\n", pager.page() + 1, pager.total_pages());
        }

        let actions = pager.actions();
        let keys = actions
            .iter()
            .map(|a| format!("[{}] {}", a.key(), a.label()))
            .collect::<Vec<_>>()
            .join(", ");
        let action = loop {
            let input = ask(&keys)?;
            match PageAction::from_key(&input) {
                Some(action) if actions.contains(&action) => break action,
                _ => println!("{}", "Invalid choice. Please enter one of the keys shown.".red()),
            }
        };
        if !pager.apply(action) {
            return Ok(());
        }
    }
}

fn table_headers() -> [&'static str; 4] {
    [HEADERS[0], HEADERS[1], "Year", HEADERS[3]]
}

fn clear_screen() -> Result<()> {
    execute!(stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
    Ok(())
}

fn heading(text: &str) {
    println!("{}", text.green().bold());
}

/// Print a message and leave it on screen long enough to read.
fn notice(message: &str) {
    println!("{}", message);
    thread::sleep(MESSAGE_DELAY);
}

/// `indicatif` spinner shown while a remote call runs.
fn spinner(message: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

fn choose(prompt: &str, items: &[&str]) -> Result<usize> {
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact()?;
    Ok(selection)
}

fn ask(prompt: &str) -> Result<String> {
    let value: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(value.trim().to_string())
}

fn secret(prompt: &str) -> Result<String> {
    let value = Password::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .interact()?;
    Ok(value)
}

fn confirm(prompt: &str) -> Result<bool> {
    let answer = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .interact()?;
    Ok(answer)
}
