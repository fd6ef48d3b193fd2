use resume_chat::{GeminiClient, InFlight, Orchestrator, Sender};

pub struct App {
    pub should_quit: bool,

    // Assistant core
    pub orchestrator: Orchestrator<GeminiClient>,
    pub in_flight: Option<InFlight>,
    pub model: String,

    // Input state
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars

    // Panel state
    pub features_collapsed: bool,
    pub scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(orchestrator: Orchestrator<GeminiClient>, model: String) -> Self {
        Self {
            should_quit: false,
            orchestrator,
            in_flight: None,
            model,
            input: String::new(),
            cursor: 0,
            features_collapsed: false,
            scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.orchestrator.is_busy()
    }

    /// Send the typed question; input is only cleared if it was accepted
    pub fn submit_input(&mut self) {
        if let Some(in_flight) = self.orchestrator.on_submit_free_text(&self.input) {
            self.input.clear();
            self.cursor = 0;
            self.track(in_flight);
        }
    }

    pub fn summarize(&mut self) {
        if self.features_collapsed {
            return;
        }
        if let Some(in_flight) = self.orchestrator.on_trigger_summarize() {
            self.track(in_flight);
        }
    }

    pub fn generate_questions(&mut self) {
        if self.features_collapsed {
            return;
        }
        if let Some(in_flight) = self.orchestrator.on_trigger_generate_questions() {
            self.track(in_flight);
        }
    }

    fn track(&mut self, in_flight: InFlight) {
        self.in_flight = Some(in_flight);
        self.animation_frame = 0;
        // Scroll to bottom so "Thinking..." is visible
        self.scroll_to_bottom();
    }

    /// Apply the background call's result once it has finished
    pub async fn poll_in_flight(&mut self) {
        let finished = self.in_flight.as_ref().is_some_and(|f| f.is_finished());
        if !finished {
            return;
        }
        if let Some(in_flight) = self.in_flight.take() {
            self.orchestrator.settle(in_flight).await;
            self.scroll_to_bottom();
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn page_down(&mut self) {
        let step = self.chat_height.max(2) / 2;
        self.scroll = self.scroll.saturating_add(step);
    }

    pub fn page_up(&mut self) {
        let step = self.chat_height.max(2) / 2;
        self.scroll = self.scroll.saturating_sub(step);
    }

    pub fn scroll_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in self.orchestrator.transcript() {
            total_lines = total_lines.saturating_add(1); // "You:" or "AI:"
            for line in msg.text.lines() {
                // Character count, not bytes, for UTF-8 text
                let char_count = line.chars().count();
                let wrapped = if char_count == 0 { 1 } else { char_count / wrap_width + 1 };
                total_lines = total_lines.saturating_add(wrapped as u16);
            }
            if msg.text.is_empty() && msg.sender == Sender::Assistant {
                total_lines = total_lines.saturating_add(1);
            }
            total_lines = total_lines.saturating_add(1); // blank separator
        }

        if self.is_loading() {
            total_lines = total_lines.saturating_add(2); // "AI:" + "Thinking..."
        }

        let visible_height = if self.chat_height > 0 { self.chat_height } else { 20 };

        self.scroll = total_lines.saturating_sub(visible_height);
    }
}
