impl<S> StateMachine<S>
where
    S: KeyValueStore,
{
    /// Enters the home screen and draws the first frame.
    pub fn start(&mut self, now_ms: u64, canvas: &mut dyn Canvas) {
        self.state = AppState::Main;
        self.pending_redraw = false;
        let (screens, mut ctx) = self.split(now_ms);
        let screen = screens.get_mut(AppState::Main);
        screen.signals().clear();
        screen.enter(&mut ctx);
        screen.draw(&ctx, canvas);
        canvas.show();
        let _ = screen.needs_redraw();
    }

    /// One loop iteration. Returns `RenderRequested` when a frame was pushed.
    pub fn tick<I>(&mut self, now_ms: u64, input: &mut I, canvas: &mut dyn Canvas) -> TickResult
    where
        I: InputSource + ?Sized,
    {
        let from = self.state;
        let mut redraw = core::mem::take(&mut self.pending_redraw);
        let (screens, mut ctx) = self.split(now_ms);

        let screen = screens.get_mut(from);
        screen.tick(&mut ctx);
        if screen.needs_redraw() {
            redraw = true;
        }

        let delta = input.take_encoder_delta();
        if delta != 0 {
            screen.on_encoder(delta, &mut ctx);
            redraw = true;
        }

        match input.take_button_event() {
            ButtonEvent::Short => {
                screen.on_short(&mut ctx);
                redraw = true;
            }
            ButtonEvent::Long => {
                screen.on_long(&mut ctx);
                redraw = true;
            }
            ButtonEvent::None => {}
        }

        let Some(to) = screen.requested_state() else {
            if !redraw {
                return TickResult::NoRender;
            }
            screen.draw(&ctx, canvas);
            canvas.show();
            return TickResult::RenderRequested;
        };

        debug!("app: {:?} -> {:?}", from, to);
        screen.exit(&mut ctx);
        default_handoff(&mut *ctx.handoff, &*ctx.presets, from, to);

        let next = screens.get_mut(to);
        next.signals().clear();
        next.enter(&mut ctx);
        next.draw(&ctx, canvas);
        canvas.show();
        // The entry frame covers anything flagged during enter.
        let _ = next.needs_redraw();

        self.state = to;
        TickResult::RenderRequested
    }
}
