//! Parse tables for the XPath 1.0 grammar.
//!
//! Each action row is indexed by terminal column (`TokenKind::column`). `ACTION_KIND` holds
//! `s` (shift), `r` (reduce), `a` (accept) or a blank for a syntax error; `ACTION_TARGET`
//! holds the target state (shift) or production (reduce), offset by 32. `GOTO` rows are
//! indexed by nonterminal - 2 and hold the successor state offset by 33.

pub(crate) const STATE_COUNT: usize = 108;

pub(crate) const ACTION_KIND: [&[u8; 36]; STATE_COUNT] = [
    b" s s        sssssssss    s ss  s  ss",
    b"                 s                  ",
    b"r  rrrrrrrrr         rrrrrrr rr  r  ",
    b"                rrrrr               ",
    b" s s        sssssssss    s ss  s  ss",
    b"rs  rrrrrrrr s  sssssrrrrrr  rrs rs ",
    b" s s        sssssssss    s ss  s  ss",
    b"                            s       ",
    b"                            s       ",
    b"r  rrrrrrrrr         rrrrrrr rr rr  ",
    b"r  rrrrrrrrr         rrrrrrr rr rr  ",
    b"r  rrrrrrrrr         rrrrrrr rr rr  ",
    b"r  rrrrrrrrr         rrrrrrr rr rr  ",
    b"r  rrrrrrrrr         rrrrrrr rr rr  ",
    b"  s                                 ",
    b"                            s       ",
    b" s           s  sssss          s  s ",
    b"r  rrrrrrrrr         rrrrrrr rr  r  ",
    b"a                                   ",
    b"r       s                    rr  r  ",
    b"r      sr                    rr  r  ",
    b"r   s  rr            s       rr  r  ",
    b"r   rssrr            rss     rr  r  ",
    b"r   rrrrr            rrrss   rr  r  ",
    b"r   rrrrrsss         rrrrr   rr  r  ",
    b"r   rrrrrrrr         rrrrr   rr  r  ",
    b"r   rrrrrrrr         rrrrrs  rr  r  ",
    b"r   rrrrrrrr         rrrrrr  rr  r  ",
    b"r   rrrrrrrr         rrrrrr  rr  r  ",
    b"r  srrrrrrrr         rrrrrrs rr sr  ",
    b"r  srrrrrrrr         rrrrrrs rr  r  ",
    b"r  rrrrrrrrr         rrrrrrr rr rr  ",
    b"r  rrrrrrrrr         rrrrrrr rr rr  ",
    b"r  rrrrrrrrr         rrrrrrr rr rr  ",
    b"r   rrrrrrrr         rrrrrr  rr  r  ",
    b"r   rrrrrrrr         rrrrrr  rr  r  ",
    b"r  rrrrrrrrr         rrrrrrr rr  r  ",
    b"r  rrrrrrrrr         rrrrrrr rr  r  ",
    b"                sssss               ",
    b"r  rrrrrrrrr         rrrrrrr rr sr  ",
    b"r  rrrrrrrrr         rrrrrrr rr  r  ",
    b"r  rrrrrrrrr         rrrrrrr rr rr  ",
    b"r  rrrrrrrrr         rrrrrrr rr rr  ",
    b"                             s      ",
    b"r  srrrrrrrr         rrrrrrs rr  r  ",
    b"r   rrrrrrrr         rrrrr   rr  r  ",
    b"              s                     ",
    b"                             s      ",
    b"                rrrrr               ",
    b" s s        sssssssss    s sss s  ss",
    b"r  srrrrrrrr         rrrrrrs rr  r  ",
    b" s s        sssssssss    s ss  s  ss",
    b" s s        sssssssss    s ss  s  ss",
    b" s s        sssssssss    s ss  s  ss",
    b" s s        sssssssss    s ss  s  ss",
    b" s s        sssssssss    s ss  s  ss",
    b" s s        sssssssss    s ss  s  ss",
    b" s s        sssssssss    s ss  s  ss",
    b" s s        sssssssss    s ss  s  ss",
    b" s s        sssssssss    s ss  s  ss",
    b" s s        sssssssss    s ss  s  ss",
    b" s s        sssssssss    s ss  s  ss",
    b" s s        sssssssss    s ss  s  ss",
    b" s s        sssssssss    s ss  s  ss",
    b" s s        sssssssss      ss  s  ss",
    b" s s        sssssssss    s ss  s  ss",
    b" s           s  sssss          s  s ",
    b" s           s  sssss          s  s ",
    b"r  rrrrrrrrr         rrrrrrr rr rr  ",
    b" s           s  sssss          s  s ",
    b" s           s  sssss          s  s ",
    b"r  rrrrrrrrr         rrrrrrr rr sr  ",
    b"r  rrrrrrrrr         rrrrrrr rr sr  ",
    b"r  rrrrrrrrr         rrrrrrr rr  r  ",
    b"r  rrrrrrrrr         rrrrrrr rr rr  ",
    b"                             s      ",
    b"r  rrrrrrrrr         rrrrrrr rr rr  ",
    b"r  rrrrrrrrr         rrrrrrr rr rr  ",
    b"                             rr     ",
    b"                             s      ",
    b"                             rs     ",
    b"r      sr                    rr  r  ",
    b"r   s  rr            s       rr  r  ",
    b"r   rssrr            rss     rr  r  ",
    b"r   rssrr            rss     rr  r  ",
    b"r   rrrrr            rrrss   rr  r  ",
    b"r   rrrrr            rrrss   rr  r  ",
    b"r   rrrrr            rrrss   rr  r  ",
    b"r   rrrrr            rrrss   rr  r  ",
    b"r   rrrrrsss         rrrrr   rr  r  ",
    b"r   rrrrrsss         rrrrr   rr  r  ",
    b"r   rrrrrrrr         rrrrr   rr  r  ",
    b"r   rrrrrrrr         rrrrr   rr  r  ",
    b"r   rrrrrrrr         rrrrr   rr  r  ",
    b"r   rrrrrrrr         rrrrrr  rr  r  ",
    b"                                 r  ",
    b"                                 s  ",
    b"r  srrrrrrrr         rrrrrrs rr  r  ",
    b"r  srrrrrrrr         rrrrrrs rr  r  ",
    b"r  rrrrrrrrr         rrrrrrr rr  r  ",
    b"r  rrrrrrrrr         rrrrrrr rr  r  ",
    b"r  rrrrrrrrr         rrrrrrr rr  r  ",
    b"r  rrrrrrrrr         rrrrrrr rr  r  ",
    b"r  rrrrrrrrr         rrrrrrr rr rr  ",
    b"r  rrrrrrrrr         rrrrrrr rr rr  ",
    b" s s        sssssssss    s ss  s  ss",
    b"r  rrrrrrrrr         rrrrrrr rr rr  ",
    b"                             r      ",
];

pub(crate) const ACTION_TARGET: [&[u8; 36]; STATE_COUNT] = [
    b" 1 0        /.-,+*)('    & %$  #  \"!",
    b"                 J                  ",
    b"a  aaaaaaaaa         aaaaaaa aa  a  ",
    b"                YYYYY               ",
    b" 1 0        /.-,+*)('    & %$  #  \"!",
    b"K1  KKKKKKKK .  +*)('KKKKKK  KK# K\" ",
    b" 1 0        /.-,+*)('    & %$  #  \"!",
    b"                            N       ",
    b"                            O       ",
    b"e  eeeeeeeee         eeeeeee ee ee  ",
    b"f  fffffffff         fffffff ff ff  ",
    b"d  ddddddddd         ddddddd dd dd  ",
    b"B  BBBBBBBBB         BBBBBBB BB BB  ",
    b"A  AAAAAAAAA         AAAAAAA AA AA  ",
    b"  P                                 ",
    b"                            Q       ",
    b" 1           .  +*)('          #  \" ",
    b"b  bbbbbbbbb         bbbbbbb bb  b  ",
    b"                                    ",
    b"!       S                    !!  !  ",
    b"\"      T\"                    \"\"  \"  ",
    b"$   V  $$            U       $$  $  ",
    b"&   &ZY&&            &XW     &&  &  ",
    b")   )))))            )))\\[   ))  )  ",
    b".   ....._^]         .....   ..  .  ",
    b"1   11111111         11111   11  1  ",
    b"5   55555555         55555`  55  5  ",
    b"7   77777777         777777  77  7  ",
    b"9   99999999         999999  99  9  ",
    b":  c::::::::         ::::::b :: a:  ",
    b"I  fIIIIIIII         IIIIIIe II  I  ",
    b"=  =========         ======= == ==  ",
    b"?  ?????????         ??????? ?? ??  ",
    b"C  CCCCCCCCC         CCCCCCC CC CC  ",
    b"J   JJJJJJJJ         JJJJJJ  JJ  J  ",
    b"M   MMMMMMMM         MMMMMM  MM  M  ",
    b"N  NNNNNNNNN         NNNNNNN NN  N  ",
    b"P  PPPPPPPPP         PPPPPPP PP  P  ",
    b"                +*)('               ",
    b"R  RRRRRRRRR         RRRRRRR RR aR  ",
    b"U  UUUUUUUUU         UUUUUUU UU  U  ",
    b"Z  ZZZZZZZZZ         ZZZZZZZ ZZ ZZ  ",
    b"c  ccccccccc         ccccccc cc cc  ",
    b"                             j      ",
    b"L  fLLLLLLLL         LLLLLLe LL  L  ",
    b"6   66666666         66666   66  6  ",
    b"              k                     ",
    b"                             l      ",
    b"                XXXXX               ",
    b" 1 0        /.-,+*)('    & %$m #  \"!",
    b"_  f________         ______e __  _  ",
    b" 1 0        /.-,+*)('    & %$  #  \"!",
    b" 1 0        /.-,+*)('    & %$  #  \"!",
    b" 1 0        /.-,+*)('    & %$  #  \"!",
    b" 1 0        /.-,+*)('    & %$  #  \"!",
    b" 1 0        /.-,+*)('    & %$  #  \"!",
    b" 1 0        /.-,+*)('    & %$  #  \"!",
    b" 1 0        /.-,+*)('    & %$  #  \"!",
    b" 1 0        /.-,+*)('    & %$  #  \"!",
    b" 1 0        /.-,+*)('    & %$  #  \"!",
    b" 1 0        /.-,+*)('    & %$  #  \"!",
    b" 1 0        /.-,+*)('    & %$  #  \"!",
    b" 1 0        /.-,+*)('    & %$  #  \"!",
    b" 1 0        /.-,+*)('    & %$  #  \"!",
    b" 1 0        /.-,+*)('      %$  #  \"!",
    b" 1 0        /.-,+*)('    & %$  #  \"!",
    b" 1           .  +*)('          #  \" ",
    b" 1           .  +*)('          #  \" ",
    b">  >>>>>>>>>         >>>>>>> >> >>  ",
    b" 1           .  +*)('          #  \" ",
    b" 1           .  +*)('          #  \" ",
    b"Q  QQQQQQQQQ         QQQQQQQ QQ aQ  ",
    b"V  VVVVVVVVV         VVVVVVV VV aV  ",
    b"T  TTTTTTTTT         TTTTTTT TT  T  ",
    b"@  @@@@@@@@@         @@@@@@@ @@ @@  ",
    b"                             \x87      ",
    b"[  [[[[[[[[[         [[[[[[[ [[ [[  ",
    b"D  DDDDDDDDD         DDDDDDD DD DD  ",
    b"                             HH     ",
    b"                             \x88      ",
    b"                             F\x89     ",
    b"#      T#                    ##  #  ",
    b"%   V  %%            U       %%  %  ",
    b"'   'ZY''            'XW     ''  '  ",
    b"(   (ZY((            (XW     ((  (  ",
    b"+   +++++            +++\\[   ++  +  ",
    b"*   *****            ***\\[   **  *  ",
    b"-   -----            ---\\[   --  -  ",
    b",   ,,,,,            ,,,\\[   ,,  ,  ",
    b"0   00000_^]         00000   00  0  ",
    b"/   /////_^]         /////   //  /  ",
    b"2   22222222         22222   22  2  ",
    b"3   33333333         33333   33  3  ",
    b"4   44444444         44444   44  4  ",
    b"8   88888888         888888  88  8  ",
    b"                                 ^  ",
    b"                                 \x8a  ",
    b";  f;;;;;;;;         ;;;;;;e ;;  ;  ",
    b"<  f<<<<<<<<         <<<<<<e <<  <  ",
    b"O  OOOOOOOOO         OOOOOOO OO  O  ",
    b"`  `````````         ``````` ``  `  ",
    b"S  SSSSSSSSS         SSSSSSS SS  S  ",
    b"W  WWWWWWWWW         WWWWWWW WW  W  ",
    b"\\  \\\\\\\\\\\\\\\\\\         \\\\\\\\\\\\\\ \\\\ \\\\  ",
    b"E  EEEEEEEEE         EEEEEEE EE EE  ",
    b" 1 0        /.-,+*)('    & %$  #  \"!",
    b"]  ]]]]]]]]]         ]]]]]]] ]] ]]  ",
    b"                             G      ",
];

pub(crate) const GOTO: [&[u8; 29]; STATE_COUNT] = [
    b"3456789:;<=>?@ AB  CDEFGH IJ ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"L456789:;<=>?@ AB  CDEFGH IJ ",
    b"            M        EFGH IJ ",
    b"       N;<=>?@ AB  CDEFGH IJ ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"            S        EFGH IJ ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"              e              ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                        h  J ",
    b"              i          j   ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"o456789:;<=>?@ ABpqCDEFGH IJ ",
    b"                             ",
    b"  r6789:;<=>?@ AB  CDEFGH IJ ",
    b"   s789:;<=>?@ AB  CDEFGH IJ ",
    b"    t89:;<=>?@ AB  CDEFGH IJ ",
    b"    u89:;<=>?@ AB  CDEFGH IJ ",
    b"     v9:;<=>?@ AB  CDEFGH IJ ",
    b"     w9:;<=>?@ AB  CDEFGH IJ ",
    b"     x9:;<=>?@ AB  CDEFGH IJ ",
    b"     y9:;<=>?@ AB  CDEFGH IJ ",
    b"      z:;<=>?@ AB  CDEFGH IJ ",
    b"      {:;<=>?@ AB  CDEFGH IJ ",
    b"       |;<=>?@ AB  CDEFGH IJ ",
    b"       };<=>?@ AB  CDEFGH IJ ",
    b"       ~;<=>?@ AB  CDEFGH IJ ",
    b"         \x7f=>?@ AB  CDEFGH IJ ",
    b"\x80456789:;<=>?@ AB  CDEFGH IJ\x81",
    b"            \x82        EFGH IJ ",
    b"            \x83        EFGH IJ ",
    b"                             ",
    b"                     \x84 GH IJ ",
    b"                     \x85 GH IJ ",
    b"              i          \x86   ",
    b"              i          \x87   ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"                             ",
    b"o456789:;<=>?@ AB\x8cqCDEFGH IJ ",
    b"                             ",
    b"                             ",
];

/// `(left-hand nonterminal, right-hand side length)` per production.
pub(crate) const PRODUCTIONS: [(u8, u8); 71] = [
    (1, 1), // 0
    (2, 1), // 1
    (3, 1), // 2
    (3, 3), // 3
    (4, 1), // 4
    (4, 3), // 5
    (5, 1), // 6
    (5, 3), // 7
    (5, 3), // 8
    (6, 1), // 9
    (6, 3), // 10
    (6, 3), // 11
    (6, 3), // 12
    (6, 3), // 13
    (7, 1), // 14
    (7, 3), // 15
    (7, 3), // 16
    (8, 1), // 17
    (8, 3), // 18
    (8, 3), // 19
    (8, 3), // 20
    (9, 1), // 21
    (9, 2), // 22
    (10, 1), // 23
    (10, 3), // 24
    (11, 1), // 25
    (11, 1), // 26
    (11, 3), // 27
    (11, 3), // 28
    (13, 1), // 29
    (13, 2), // 30
    (15, 1), // 31
    (15, 3), // 32
    (15, 1), // 33
    (15, 1), // 34
    (15, 1), // 35
    (18, 3), // 36
    (18, 4), // 37
    (19, 1), // 38
    (19, 3), // 39
    (20, 1), // 40
    (12, 1), // 41
    (12, 1), // 42
    (21, 1), // 43
    (21, 2), // 44
    (21, 1), // 45
    (14, 1), // 46
    (14, 3), // 47
    (14, 1), // 48
    (23, 2), // 49
    (23, 1), // 50
    (23, 3), // 51
    (23, 2), // 52
    (23, 1), // 53
    (27, 1), // 54
    (27, 2), // 55
    (25, 2), // 56
    (25, 1), // 57
    (26, 1), // 58
    (26, 3), // 59
    (26, 4), // 60
    (16, 3), // 61
    (30, 1), // 62
    (22, 2), // 63
    (24, 3), // 64
    (28, 1), // 65
    (28, 1), // 66
    (17, 2), // 67
    (29, 1), // 68
    (29, 1), // 69
    (29, 1), // 70
];

pub(crate) enum Action {
    Shift(usize),
    Reduce(usize),
    Accept,
    Error,
}

pub(crate) fn action(state: usize, column: usize) -> Action {
    let target = usize::from(ACTION_TARGET[state][column]).saturating_sub(32);
    match ACTION_KIND[state][column] {
        b's' => Action::Shift(target),
        b'r' => Action::Reduce(target),
        b'a' => Action::Accept,
        _ => Action::Error,
    }
}

pub(crate) fn goto(state: usize, nonterminal: u8) -> Option<usize> {
    let cell = *GOTO[state].get(usize::from(nonterminal).checked_sub(2)?)?;
    cell.checked_sub(33).map(usize::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_reduce_names_a_production() {
        for state in 0..STATE_COUNT {
            for column in 0..36 {
                if let Action::Reduce(p) = action(state, column) {
                    assert!(p < PRODUCTIONS.len(), "state {state} column {column}");
                }
                if let Action::Shift(s) = action(state, column) {
                    assert!(s < STATE_COUNT, "state {state} column {column}");
                }
            }
        }
    }

    #[test]
    fn test_start_state_expects_an_expression() {
        // a leading number is shifted, a leading `)` is an error
        assert!(matches!(action(0, 15), Action::Shift(_)));
        assert!(matches!(action(0, 29), Action::Error));
    }
}
