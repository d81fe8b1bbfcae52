use std::{
    collections::HashMap,
    error::Error,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver},
    thread,
};

use chime::{
    alarm::parse_time,
    communication::{Message, MessageType},
    list::AlarmList,
    store::AlarmStore,
    Chime,
};
use clap::{command, Parser, Subcommand};
use eframe::run_native;
use log::{error, info, warn};
use rodio::{
    source::{SineWave, Source},
    Decoder, OutputStream, Sink,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// create the alarm file
    Init {
        #[clap(long, short)]
        force: bool,
    },
    /// add an alarm without opening the gui
    Add {
        /// alarm time, HH:MM on a 24 hour clock
        time: String,
        #[clap(long, short)]
        label: Option<String>,
        /// comma separated days to repeat on, e.g. mon,tue,fri
        #[clap(long, short)]
        repeat: Option<String>,
        /// sound file to play instead of the built in beep
        #[clap(long, short)]
        sound: Option<PathBuf>,
    },
    /// enable or disable an alarm by id
    Toggle { id: u64 },
    /// print the saved alarms
    List,
}

fn main() -> Result<(), Box<dyn Error>> {
    // initialize the logger
    simple_file_logger::init_logger!("chime").expect("couldn't initialize logger");

    let path = AlarmStore::default_path().ok_or("couldn't determine the alarm file location")?;
    let store = AlarmStore::new(path);

    let args = Args::parse();
    match args.command {
        Some(Command::Init { force }) => return init(&store, force),
        Some(Command::Add {
            time,
            label,
            repeat,
            sound,
        }) => return add(&store, &time, label, repeat.as_deref(), sound),
        Some(Command::Toggle { id }) => return toggle(&store, id),
        Some(Command::List) => return list(&store),
        None => {}
    }

    let native_options = eframe::NativeOptions {
        initial_window_size: Some(eframe::egui::vec2(420.0, 480.0)),
        ..Default::default()
    };
    // alarms keep ringing while the gui thread is busy
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || ring_alarms(&rx));

    run_native(
        "Chime",
        native_options,
        Box::new(|_| Box::new(Chime::new(store, tx))),
    )
    .map_err(Into::into)
}

fn init(store: &AlarmStore, force: bool) -> Result<(), Box<dyn Error>> {
    if store.path().exists() && !force {
        println!(
            "{} already exists, pass --force to start over",
            store.path().display()
        );
        return Ok(());
    }
    store.save(&[])?;
    println!("created {}", store.path().display());
    Ok(())
}

fn add(
    store: &AlarmStore,
    time: &str,
    label: Option<String>,
    repeat: Option<&str>,
    sound: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let time = parse_time(time)?;
    let repeat = repeat.map(parse_days).transpose()?;
    let mut alarms = AlarmList::from_alarms(store.load()?);
    let alarm = alarms.add(time, label, repeat, sound);
    println!(
        "added alarm {} at {}",
        alarm.id,
        alarm.time.format("%H:%M")
    );
    store.save(alarms.alarms())?;
    Ok(())
}

fn toggle(store: &AlarmStore, id: u64) -> Result<(), Box<dyn Error>> {
    let mut alarms = AlarmList::from_alarms(store.load()?);
    let Some(enabled) = alarms.toggle(id) else {
        return Err(format!("no alarm with id {id}").into());
    };
    store.save(alarms.alarms())?;
    println!("alarm {id} {}", if enabled { "enabled" } else { "disabled" });
    Ok(())
}

fn list(store: &AlarmStore) -> Result<(), Box<dyn Error>> {
    let alarms = store.load()?;
    if alarms.is_empty() {
        println!("no alarms");
        return Ok(());
    }
    for alarm in &alarms {
        println!(
            "{:>3}  {}  {:<13}  {}  {}",
            alarm.id,
            alarm.time.format("%H:%M"),
            alarm.repeat_summary(),
            if alarm.enabled { "on " } else { "off" },
            alarm.display_label(),
        );
    }
    Ok(())
}

fn parse_days(input: &str) -> Result<[bool; 7], Box<dyn Error>> {
    let mut days = [false; 7];
    for day in input.split(',') {
        let index = match day.trim().to_lowercase().as_str() {
            "mon" | "monday" => 0,
            "tue" | "tuesday" => 1,
            "wed" | "wednesday" => 2,
            "thu" | "thursday" => 3,
            "fri" | "friday" => 4,
            "sat" | "saturday" => 5,
            "sun" | "sunday" => 6,
            other => return Err(format!("unknown day {other:?}").into()),
        };
        days[index] = true;
    }
    Ok(days)
}

// plays ringing alarms until told to stop. lives on its own thread so
// decoding and playback never touch the gui loop
fn ring_alarms(rx: &Receiver<Message>) {
    let Ok((_stream, handle)) = OutputStream::try_default() else {
        error!("no audio output device, alarms will be silent");
        while rx.recv().is_ok() {}
        return;
    };
    let mut ringing: HashMap<u64, Sink> = HashMap::new();
    loop {
        match rx.recv() {
            Ok(Message {
                kind: MessageType::Ring { sound },
                alarm_id,
            }) => {
                let Ok(sink) = Sink::try_new(&handle) else {
                    error!("couldn't open an audio sink for alarm {alarm_id}");
                    continue;
                };
                match sound.as_deref().map(open_sound) {
                    Some(Ok(source)) => sink.append(source),
                    Some(Err(e)) => {
                        warn!("{e}, falling back to the built in beep");
                        sink.append(beep());
                    }
                    None => sink.append(beep()),
                }
                info!("alarm {alarm_id} ringing");
                ringing.insert(alarm_id, sink);
            }
            Ok(Message {
                kind: MessageType::Stop,
                alarm_id,
            }) => {
                if let Some(sink) = ringing.remove(&alarm_id) {
                    info!("alarm {alarm_id} stopped");
                    sink.stop();
                }
            }
            // the gui is gone
            Err(_) => break,
        }
    }
}

fn open_sound(
    path: &Path,
) -> Result<rodio::source::Repeat<Decoder<BufReader<File>>>, Box<dyn Error>> {
    let file = File::open(path)
        .map_err(|e| format!("couldn't open sound file {}: {e}", path.display()))?;
    let decoder = Decoder::new(BufReader::new(file))
        .map_err(|e| format!("couldn't decode sound file {}: {e}", path.display()))?;
    Ok(decoder.repeat_infinite())
}

fn beep() -> impl Source<Item = f32> + Send {
    SineWave::new(880.0).amplify(0.20)
}
