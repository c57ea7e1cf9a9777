use std::time::{Duration, Instant, SystemTime};

use anyhow::{Context, Result, bail};
use chrono::{TimeZone, Utc};
use tracing_subscriber::EnvFilter;

use bluesbook_client::api::{ApiClient, MAX_CHAT_MESSAGE_LEN};
use bluesbook_client::models::{
    ChatMessage, Player, SearchCategory, SearchHit, SortBy, SquadFilters,
};
use bluesbook_client::prefs::{FileBackend, MemoryBackend, PreferenceStore};
use bluesbook_client::search::SearchSession;
use bluesbook_client::suggest;
use bluesbook_client::view::{ListView, ViewQuery};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        print_usage();
        return Ok(());
    };

    let client = ApiClient::from_env()?;
    match command.as_str() {
        "squad" => cmd_squad(&client, &args[1..]),
        "search" => cmd_search(&client, &args[1..]),
        "suggest" => cmd_suggest(&client, &args[1..]),
        "player" => cmd_player(&client, &args[1..]),
        "random" => cmd_random(&client),
        "manager" => cmd_manager(&client, &args[1..]),
        "stats" => cmd_stats(&client),
        "chat" => cmd_chat(&client, &args[1..]),
        "fav" => cmd_fav(&args[1..]),
        "recent" => cmd_recent(),
        "warm" => cmd_warm(&client, &args[1..]),
        other => {
            print_usage();
            bail!("unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("bluesbook_client - Blue's Book squad browser");
    println!();
    println!("Usage:");
    println!("  squad [position] [nationality]   list the squad, optionally filtered");
    println!("  search <query> [players|managers] global search");
    println!("  suggest <query>                  type-ahead suggestions");
    println!("  player <id>                      one player profile");
    println!("  random                           a random player profile");
    println!("  manager [query]                  the current manager, or a manager search");
    println!("  stats                            advanced squad statistics");
    println!("  chat [message]                   ask the club chatbot; no message lists prompts");
    println!("  fav [id]                         list favorites, or toggle one");
    println!("  recent                           recently viewed players");
    println!("  warm <id> [id...]                prefetch player profiles in parallel");
}

fn cmd_squad(client: &ApiClient, args: &[String]) -> Result<()> {
    let filters = SquadFilters {
        position: args.first().cloned(),
        nationality: args.get(1).cloned(),
        sort_by: SortBy::JerseyNumber,
    };

    let mut view: ListView<Vec<Player>> = ListView::new();
    let ticket = view.begin(ViewQuery::new(
        filters.position.clone().unwrap_or_default(),
        SearchCategory::Players,
    ));
    let result = client.fetch_squad(&filters);
    view.resolve_with(
        ticket,
        result,
        |players| {
            println!("{} players", players.len());
            for player in players {
                print_player_row(player);
            }
        },
        |message| println!("squad fetch failed: {message}"),
    );
    Ok(())
}

fn cmd_search(client: &ApiClient, args: &[String]) -> Result<()> {
    let Some(query) = args.first() else {
        bail!("search needs a query");
    };
    let category = match args.get(1).map(String::as_str) {
        Some("players") => SearchCategory::Players,
        Some("managers") => SearchCategory::Managers,
        _ => SearchCategory::All,
    };

    let mut session = SearchSession::from_env();
    let started = Instant::now();
    if !session.on_input(query, category, 10, started) {
        println!(
            "query too short (minimum {} characters)",
            suggest::MIN_QUERY_LEN
        );
        return Ok(());
    }
    // One-shot invocation: jump straight past the debounce window.
    let poll_at = session
        .next_due()
        .map(|due| due + Duration::from_millis(1))
        .unwrap_or(started);
    let Some(key) = session.poll_due(poll_at) else {
        return Ok(());
    };

    let hits = session
        .run(&key, SystemTime::now(), || {
            client.global_search(&key.query, key.category, key.limit)
        })
        .with_context(|| format!("search for {query:?}"))?;

    if hits.is_empty() {
        println!("no results for {query:?}");
        return Ok(());
    }
    for hit in &hits {
        match hit {
            SearchHit::Player(p) => {
                let pos = p.position.as_deref().unwrap_or("-");
                println!("player   {:24} {}", p.name, pos);
            }
            SearchHit::Manager(m) => {
                let nat = m.nationality.as_deref().unwrap_or("-");
                println!("manager  {:24} {}", m.name, nat);
            }
        }
    }
    Ok(())
}

fn cmd_suggest(client: &ApiClient, args: &[String]) -> Result<()> {
    let Some(query) = args.first() else {
        bail!("suggest needs a query");
    };
    let session = SearchSession::from_env();
    let raw = client
        .search_suggestions(query, session.max_suggestions() as u32)
        .with_context(|| format!("suggestions for {query:?}"))?;
    for record in session.suggestions(&raw, query) {
        println!("{:40} {}", record.text, record.summary);
    }
    Ok(())
}

fn cmd_player(client: &ApiClient, args: &[String]) -> Result<()> {
    let Some(id) = args.first() else {
        bail!("player needs an id");
    };
    let player = client
        .fetch_player(id)
        .with_context(|| format!("fetch player {id}"))?;
    print_player_profile(&player);

    if let Some(backend) = FileBackend::new() {
        let mut store = PreferenceStore::new(backend);
        store.add_recent(&player.id);
    }
    Ok(())
}

fn cmd_random(client: &ApiClient) -> Result<()> {
    let player = client
        .fetch_random_player()
        .context("fetch random player")?;
    print_player_profile(&player);
    Ok(())
}

fn cmd_manager(client: &ApiClient, args: &[String]) -> Result<()> {
    if let Some(query) = args.first() {
        let managers = client
            .search_managers(query)
            .with_context(|| format!("search managers for {query:?}"))?;
        if managers.is_empty() {
            println!("no managers matching {query:?}");
        }
        for manager in managers {
            println!("{} ({})", manager.name, manager.nationality);
        }
        return Ok(());
    }

    let manager = client
        .fetch_current_manager()
        .context("fetch current manager")?;
    println!("{} ({})", manager.name, manager.nationality);
    if let Some(start) = &manager.tenure_start {
        println!("in charge since {start}");
    }
    Ok(())
}

fn cmd_stats(client: &ApiClient) -> Result<()> {
    let stats = client
        .fetch_statistics()
        .context("fetch squad statistics")?;
    let basics = &stats.basic_metrics;
    println!("players:        {}", basics.total_players);
    println!("average age:    {:.1}", basics.average_age);
    println!("nationalities:  {}", basics.nationalities);
    println!("academy grads:  {}", basics.academy_graduates);

    let mut depth: Vec<_> = stats.tactical_analysis.position_depth.iter().collect();
    depth.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
    if !depth.is_empty() {
        println!();
        println!("position depth:");
        for (position, count) in depth {
            println!("  {position:16} {count}");
        }
    }
    Ok(())
}

fn cmd_chat(client: &ApiClient, args: &[String]) -> Result<()> {
    let message = args.join(" ");
    let message = message.trim();
    if message.is_empty() {
        println!("things to ask:");
        for suggestion in client
            .fetch_chat_suggestions()
            .context("fetch chat suggestions")?
        {
            println!("  {suggestion}");
        }
        return Ok(());
    }
    if message.chars().count() > MAX_CHAT_MESSAGE_LEN {
        bail!("message too long (maximum {MAX_CHAT_MESSAGE_LEN} characters)");
    }

    match client.chat_health() {
        Ok(health) if !health.healthy => {
            println!(
                "chat service degraded ({})",
                health.status.as_deref().unwrap_or("unknown")
            );
        }
        Err(err) => println!("chat health check failed: {err}"),
        _ => {}
    }

    let history = vec![ChatMessage::user(message, Utc::now().timestamp())];
    let reply = client
        .chat_send(message, &history)
        .context("send chat message")?;
    if let Some(ts) = reply.timestamp
        && let Some(when) = Utc.timestamp_opt(ts, 0).single()
    {
        println!("[{}]", when.format("%H:%M:%S"));
    }
    println!("{}", reply.message);
    Ok(())
}

fn cmd_fav(args: &[String]) -> Result<()> {
    let mut store = open_store();
    if let Some(id) = args.first() {
        if store.toggle_favorite(id) {
            println!("added {id} to favorites");
        } else {
            println!("removed {id} from favorites");
        }
        return Ok(());
    }
    if store.favorites().is_empty() {
        println!("no favorites yet");
    }
    for id in store.favorites() {
        println!("{id}");
    }
    Ok(())
}

fn cmd_recent() -> Result<()> {
    let store = open_store();
    if store.recents().is_empty() {
        println!("no recently viewed players");
    }
    for id in store.recents() {
        println!("{id}");
    }
    Ok(())
}

fn cmd_warm(client: &ApiClient, args: &[String]) -> Result<()> {
    if args.is_empty() {
        bail!("warm needs at least one player id");
    }
    let started = Instant::now();
    let (players, errors) = client.fetch_players_parallel(args);
    println!(
        "fetched {} of {} profiles in {:?}",
        players.len(),
        args.len(),
        started.elapsed()
    );
    for err in errors {
        println!("  {err}");
    }
    Ok(())
}

enum Store {
    File(PreferenceStore<FileBackend>),
    Memory(PreferenceStore<MemoryBackend>),
}

impl Store {
    fn toggle_favorite(&mut self, id: &str) -> bool {
        match self {
            Store::File(store) => store.toggle_favorite(id),
            Store::Memory(store) => store.toggle_favorite(id),
        }
    }

    fn favorites(&self) -> &[String] {
        match self {
            Store::File(store) => store.favorites(),
            Store::Memory(store) => store.favorites(),
        }
    }

    fn recents(&self) -> &[String] {
        match self {
            Store::File(store) => store.recents(),
            Store::Memory(store) => store.recents(),
        }
    }
}

fn open_store() -> Store {
    match FileBackend::new() {
        Some(backend) => Store::File(PreferenceStore::new(backend)),
        None => {
            tracing::warn!("no cache directory available, preferences will not persist");
            Store::Memory(PreferenceStore::new(MemoryBackend::default()))
        }
    }
}

fn print_player_row(player: &Player) {
    println!(
        "#{:<3} {:24} {:4} {}",
        player.jersey_number, player.name, player.position, player.nationality
    );
}

fn print_player_profile(player: &Player) {
    println!("{} (#{})", player.name, player.jersey_number);
    println!("position:    {}", player.position);
    println!("nationality: {}", player.nationality);
    if let Some(age) = player.age {
        println!("age:         {age}");
    }
    if let Some(fee) = &player.signing_fee {
        println!("signing fee: {fee}");
    }
    if let Some(salary) = &player.weekly_salary {
        println!("salary:      {salary}/week");
    }
    if !player.fun_facts.is_empty() {
        println!();
        for fact in &player.fun_facts {
            println!("* {fact}");
        }
    }
}
